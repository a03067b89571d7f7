//! Author endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::author::{Author, AuthorQuery, CreateAuthor, UpdateAuthor},
};

/// List authors with optional filters
#[utoipa::path(
    get,
    path = "/authors/",
    tag = "authors",
    params(
        ("role" = Option<String>, Query, description = "Filter by credited role (case-insensitive)"),
        ("ordering" = Option<String>, Query, description = "Order by field, prefix with '-' for descending")
    ),
    responses(
        (status = 200, description = "List of authors", body = [Author])
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    Query(query): Query<AuthorQuery>,
) -> AppResult<Json<Vec<Author>>> {
    let authors = state.services.authors.list(&query).await?;
    Ok(Json(authors))
}

/// Get author details by ID
#[utoipa::path(
    get,
    path = "/authors/{id}/",
    tag = "authors",
    params(
        ("id" = i64, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Author>> {
    let author = state.services.authors.get(id).await?;
    Ok(Json(author))
}

/// Create a new author, optionally linking or creating books
#[utoipa::path(
    post,
    path = "/authors/",
    tag = "authors",
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    Json(author): Json<CreateAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let created = state.services.authors.create(author).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an author
#[utoipa::path(
    put,
    path = "/authors/{id}/",
    tag = "authors",
    request_body = UpdateAuthor,
    params(
        ("id" = i64, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(update): Json<UpdateAuthor>,
) -> AppResult<Json<Author>> {
    let author = state.services.authors.update(id, update).await?;
    Ok(Json(author))
}

/// Partially update an author
#[utoipa::path(
    patch,
    path = "/authors/{id}/",
    tag = "authors",
    request_body = UpdateAuthor,
    params(
        ("id" = i64, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn patch_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(update): Json<UpdateAuthor>,
) -> AppResult<Json<Author>> {
    let author = state.services.authors.update(id, update).await?;
    Ok(Json(author))
}

/// Delete an author
#[utoipa::path(
    delete,
    path = "/authors/{id}/",
    tag = "authors",
    params(
        ("id" = i64, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author is still linked to books")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.authors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
