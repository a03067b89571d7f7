//! Reference resolution: id, natural key, or embedded object.
//!
//! Every resolver runs on the caller's transaction connection, so entities
//! created while resolving a reference commit or roll back together with the
//! enclosing write. When an embedded object's natural key matches an existing
//! row, the existing row wins and the remaining supplied fields are ignored.
//! Id and name lookups never create.

use serde_json::{Map, Value};
use sqlx::PgConnection;
use validator::Validate;

use crate::{
    error::{AppError, AppResult, FieldErrors},
    models::{
        author::NewAuthor,
        book::{CreateBook, WriteContext},
        genre::validate_genre_choice,
        reference::EntityRef,
    },
};

use super::books;

/// Extract a non-blank natural-key string from an embedded object.
fn embedded_key(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Resolve a genre reference to its id, creating the genre when the
/// reference is an object with an unknown name.
pub(crate) async fn resolve_genre(
    conn: &mut PgConnection,
    field: &str,
    reference: &EntityRef,
) -> AppResult<i64> {
    match reference {
        EntityRef::Id(id) => sqlx::query_scalar::<_, i64>("SELECT id FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::field(field, "no genre exists with this id")),
        EntityRef::Key(name) => sqlx::query_scalar::<_, i64>("SELECT id FROM genres WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::field(field, "no genre exists with this name")),
        EntityRef::Embedded(object) => {
            let Some(name) = embedded_key(object, "name") else {
                return Err(AppError::field(
                    field,
                    "genre name is required when creating a genre",
                ));
            };

            let existing: Option<i64> =
                sqlx::query_scalar("SELECT id FROM genres WHERE name = $1")
                    .bind(&name)
                    .fetch_optional(&mut *conn)
                    .await?;
            if let Some(id) = existing {
                return Ok(id);
            }

            if let Err(error) = validate_genre_choice(&name) {
                let message = error
                    .message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "invalid genre name".to_string());
                return Err(AppError::field(field, message));
            }

            let id =
                sqlx::query_scalar::<_, i64>("INSERT INTO genres (name) VALUES ($1) RETURNING id")
                    .bind(&name)
                    .fetch_one(&mut *conn)
                    .await?;
            Ok(id)
        }
        EntityRef::Other(_) => Err(AppError::field(field, "must be an id, name, or object")),
    }
}

/// Resolve an author reference to its id, creating the author when the
/// reference is an object with an unknown name.
pub(crate) async fn resolve_author(
    conn: &mut PgConnection,
    field: &str,
    reference: &EntityRef,
) -> AppResult<i64> {
    match reference {
        EntityRef::Id(id) => sqlx::query_scalar::<_, i64>("SELECT id FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::field(field, "no author exists with this id")),
        EntityRef::Key(name) => {
            sqlx::query_scalar::<_, i64>("SELECT id FROM authors WHERE name = $1")
                .bind(name)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or_else(|| AppError::field(field, "no author exists with this name"))
        }
        EntityRef::Embedded(object) => {
            let Some(name) = embedded_key(object, "name") else {
                return Err(AppError::field(
                    field,
                    "author name is required when creating an author",
                ));
            };

            let existing: Option<i64> =
                sqlx::query_scalar("SELECT id FROM authors WHERE name = $1")
                    .bind(&name)
                    .fetch_optional(&mut *conn)
                    .await?;
            if let Some(id) = existing {
                return Ok(id);
            }

            let author: NewAuthor = serde_json::from_value(Value::Object(object.clone()))
                .map_err(|e| AppError::field(field, format!("invalid author object: {}", e)))?;
            author
                .validate()
                .map_err(|e| AppError::Validation(FieldErrors::from(e)))?;

            let id = sqlx::query_scalar::<_, i64>(
                "INSERT INTO authors (name, introduction, place_of_origin) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(&author.name)
            .bind(&author.introduction)
            .bind(&author.place_of_origin)
            .fetch_one(&mut *conn)
            .await?;
            Ok(id)
        }
        EntityRef::Other(_) => Err(AppError::field(field, "must be an id, name, or object")),
    }
}

/// Resolve a book reference to its id. `context` controls whether an
/// embedded book object may omit its `authors` list: only the author write
/// paths pass [`WriteContext::NestedInAuthor`] (the caller links the
/// enclosing author afterwards); everywhere else an embedded book carries
/// the full top-level creation rules.
pub(crate) async fn resolve_book(
    conn: &mut PgConnection,
    field: &str,
    reference: &EntityRef,
    context: WriteContext,
) -> AppResult<i64> {
    match reference {
        EntityRef::Id(id) => sqlx::query_scalar::<_, i64>("SELECT id FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::field(field, "no book exists with this id")),
        EntityRef::Key(title) => {
            sqlx::query_scalar::<_, i64>("SELECT id FROM books WHERE title = $1")
                .bind(title)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or_else(|| AppError::field(field, "no book exists with this title"))
        }
        EntityRef::Embedded(object) => {
            let Some(title) = embedded_key(object, "title") else {
                return Err(AppError::field(
                    field,
                    "book title is required when creating a book",
                ));
            };

            let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM books WHERE title = $1")
                .bind(&title)
                .fetch_optional(&mut *conn)
                .await?;
            if let Some(id) = existing {
                return Ok(id);
            }

            let book: CreateBook = serde_json::from_value(Value::Object(object.clone()))
                .map_err(|e| AppError::field(field, format!("invalid book object: {}", e)))?;
            book.validate()
                .map_err(|e| AppError::Validation(FieldErrors::from(e)))?;

            books::insert_book(conn, &book, context).await
        }
        EntityRef::Other(_) => Err(AppError::field(field, "must be an id, name, or object")),
    }
}
