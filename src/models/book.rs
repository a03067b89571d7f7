//! Book model and request types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::copy::CopySummary;
use super::reference::EntityRef;

/// Full book model from database. Relations and computed fields are loaded
/// separately by the repository: `coauthors` is true when the book has more
/// than one linked author, `num_copies` counts its physical copies.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub blurb: String,
    pub rating: f64,
    pub date_published: NaiveDate,
    #[sqlx(skip)]
    #[serde(default)]
    pub genres: Vec<String>,
    #[sqlx(skip)]
    #[serde(default)]
    pub authors: Vec<AuthorCredit>,
    #[sqlx(skip)]
    #[serde(default)]
    pub coauthors: bool,
    #[sqlx(skip)]
    #[serde(default)]
    pub copies: Vec<CopySummary>,
    #[sqlx(default)]
    pub num_copies: i64,
}

/// An author linked to a book through the join table, seen from the book side
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AuthorCredit {
    pub author: String,
    pub role: String,
}

/// One `authors[]` entry in a book write payload
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AuthorEntry {
    /// Author reference: id, name, or embedded author object
    #[schema(value_type = Object)]
    pub author: EntityRef,
    pub role: String,
}

/// Create book request. `authors` may only be omitted when the book is
/// embedded in an author write, in which case the enclosing author becomes
/// the implicit sole author; the books service enforces this.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "blurb must not be empty"))]
    pub blurb: String,
    #[validate(range(min = 0.0, max = 5.0, message = "rating must be between 0.0 and 5.0"))]
    pub rating: f64,
    pub date_published: NaiveDate,
    /// Genre references: id, name, or embedded genre object
    #[schema(value_type = Vec<Object>)]
    pub genres: Vec<EntityRef>,
    #[serde(default)]
    pub authors: Vec<AuthorEntry>,
}

/// Update book request. Absent fields are left unchanged; a present `genres`
/// list replaces the full genre set and a present `authors` list replaces
/// all of the book's author links.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "blurb must not be empty"))]
    pub blurb: Option<String>,
    #[validate(range(min = 0.0, max = 5.0, message = "rating must be between 0.0 and 5.0"))]
    pub rating: Option<f64>,
    pub date_published: Option<NaiveDate>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub genres: Option<Vec<EntityRef>>,
    pub authors: Option<Vec<AuthorEntry>>,
}

/// Book list query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct BookQuery {
    /// Case-insensitive exact match on a linked genre name
    pub genres: Option<String>,
    /// Case-insensitive exact match on a linked author name
    pub book_authors: Option<String>,
    /// Column name, `-` prefix for descending
    pub ordering: Option<String>,
}

/// Where a book write originates. A book embedded in an author write does
/// not require its own `authors` list — the enclosing author is implicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteContext {
    TopLevel,
    NestedInAuthor,
}
