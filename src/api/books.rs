//! Book endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
};

/// List books with optional filters
#[utoipa::path(
    get,
    path = "/books/",
    tag = "books",
    params(
        ("genres" = Option<String>, Query, description = "Filter by genre name (case-insensitive)"),
        ("book_authors" = Option<String>, Query, description = "Filter by author name (case-insensitive)"),
        ("ordering" = Option<String>, Query, description = "Order by field, prefix with '-' for descending")
    ),
    responses(
        (status = 200, description = "List of books", body = [Book])
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list(&query).await?;
    Ok(Json(books))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}/",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get(id).await?;
    Ok(Json(book))
}

/// Create a new book with its genres and author credits
#[utoipa::path(
    post,
    path = "/books/",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.books.create(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace a book
#[utoipa::path(
    put,
    path = "/books/{id}/",
    tag = "books",
    request_body = UpdateBook,
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(update): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.update(id, update).await?;
    Ok(Json(book))
}

/// Partially update a book
#[utoipa::path(
    patch,
    path = "/books/{id}/",
    tag = "books",
    request_body = UpdateBook,
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn patch_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(update): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.update(id, update).await?;
    Ok(Json(book))
}

/// Delete a book and its copies
#[utoipa::path(
    delete,
    path = "/books/{id}/",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
