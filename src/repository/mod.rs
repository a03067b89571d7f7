//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod copies;
pub mod genres;
pub(crate) mod resolve;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub genres: genres::GenresRepository,
    pub authors: authors::AuthorsRepository,
    pub books: books::BooksRepository,
    pub copies: copies::CopiesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            genres: genres::GenresRepository::new(pool.clone()),
            authors: authors::AuthorsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            copies: copies::CopiesRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Quote a string as a SQL literal for the hand-built list filters.
pub(crate) fn sql_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Translate an `ordering` query value (`field` or `-field`) into an
/// ORDER BY clause. The identifier is stripped down to alphanumerics and
/// underscores; nothing left means no ordering.
pub(crate) fn order_clause(ordering: &str) -> Option<String> {
    let (field, direction) = match ordering.strip_prefix('-') {
        Some(field) => (field, "DESC"),
        None => (ordering, "ASC"),
    };
    let ident: String = field
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if ident.is_empty() {
        None
    } else {
        Some(format!("ORDER BY {} {}", ident, direction))
    }
}
