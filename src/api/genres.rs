//! Genre endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::genre::{CreateGenre, Genre},
};

/// List all genres
#[utoipa::path(
    get,
    path = "/genres/",
    tag = "genres",
    responses(
        (status = 200, description = "List of genres", body = [Genre])
    )
)]
pub async fn list_genres(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.services.genres.list().await?;
    Ok(Json(genres))
}

/// Create a new genre
#[utoipa::path(
    post,
    path = "/genres/",
    tag = "genres",
    request_body = CreateGenre,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_genre(
    State(state): State<crate::AppState>,
    Json(genre): Json<CreateGenre>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    let created = state.services.genres.create(genre).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
