//! Author model and request types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::reference::EntityRef;

/// Full author model from database. `books` and `avg_rating` are read-only
/// derived fields filled in by the repository: `avg_rating` is the mean
/// rating across the author's linked books (2 decimal places), null when the
/// author has no books yet.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub introduction: Option<String>,
    pub place_of_origin: Option<String>,
    #[sqlx(skip)]
    #[serde(default)]
    pub books: Vec<BookCredit>,
    #[sqlx(default)]
    pub avg_rating: Option<f64>,
}

/// A book linked to an author through the join table, seen from the author side
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BookCredit {
    pub book: String,
    pub role: String,
}

/// One `books[]` entry in an author write payload
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BookEntry {
    /// Book reference: id, title, or embedded book object
    #[schema(value_type = Object)]
    pub book: EntityRef,
    pub role: String,
}

/// Create author request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub introduction: Option<String>,
    pub place_of_origin: Option<String>,
    #[serde(default)]
    pub books: Vec<BookEntry>,
}

/// Update author request. Absent fields are left unchanged; a present
/// `books` list fully replaces the author's book links.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub introduction: Option<String>,
    pub place_of_origin: Option<String>,
    pub books: Option<Vec<BookEntry>>,
}

/// Scalar author fields accepted when an author object is embedded inside a
/// book payload. Embedded authors cannot carry their own `books` entries.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewAuthor {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub introduction: Option<String>,
    pub place_of_origin: Option<String>,
}

/// Author list query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct AuthorQuery {
    /// Case-insensitive exact match on the role carried by any book link
    pub role: Option<String>,
    /// Column name, `-` prefix for descending
    pub ordering: Option<String>,
}
