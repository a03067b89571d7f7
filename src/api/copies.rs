//! Copy endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::copy::{Copy, CopyQuery, CreateCopy, UpdateCopy},
};

/// List copies with optional filters
#[utoipa::path(
    get,
    path = "/copies/",
    tag = "copies",
    params(
        ("book" = Option<String>, Query, description = "Filter by book title (case-insensitive)"),
        ("genre" = Option<String>, Query, description = "Filter by genre of the book (case-insensitive)"),
        ("lent" = Option<String>, Query, description = "Filter by lending status (true/false)"),
        ("ordering" = Option<String>, Query, description = "Order by field, prefix with '-' for descending")
    ),
    responses(
        (status = 200, description = "List of copies", body = [Copy])
    )
)]
pub async fn list_copies(
    State(state): State<crate::AppState>,
    Query(query): Query<CopyQuery>,
) -> AppResult<Json<Vec<Copy>>> {
    let copies = state.services.copies.list(&query).await?;
    Ok(Json(copies))
}

/// Get copy details by ID
#[utoipa::path(
    get,
    path = "/copies/{id}/",
    tag = "copies",
    params(
        ("id" = i64, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy details", body = Copy),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn get_copy(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Copy>> {
    let copy = state.services.copies.get(id).await?;
    Ok(Json(copy))
}

/// Create a new copy
#[utoipa::path(
    post,
    path = "/copies/",
    tag = "copies",
    request_body = CreateCopy,
    responses(
        (status = 201, description = "Copy created", body = Copy),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_copy(
    State(state): State<crate::AppState>,
    Json(copy): Json<CreateCopy>,
) -> AppResult<(StatusCode, Json<Copy>)> {
    let created = state.services.copies.create(copy).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace a copy; fields absent from the payload are cleared
#[utoipa::path(
    put,
    path = "/copies/{id}/",
    tag = "copies",
    request_body = CreateCopy,
    params(
        ("id" = i64, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy updated", body = Copy),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn replace_copy(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(copy): Json<CreateCopy>,
) -> AppResult<Json<Copy>> {
    let copy = state.services.copies.replace(id, copy).await?;
    Ok(Json(copy))
}

/// Partially update a copy; absent fields keep their stored values
#[utoipa::path(
    patch,
    path = "/copies/{id}/",
    tag = "copies",
    request_body = UpdateCopy,
    params(
        ("id" = i64, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy updated", body = Copy),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn patch_copy(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(update): Json<UpdateCopy>,
) -> AppResult<Json<Copy>> {
    let copy = state.services.copies.patch(id, update).await?;
    Ok(Json(copy))
}

/// Delete a copy
#[utoipa::path(
    delete,
    path = "/copies/{id}/",
    tag = "copies",
    params(
        ("id" = i64, Path, description = "Copy ID")
    ),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn delete_copy(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.copies.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
