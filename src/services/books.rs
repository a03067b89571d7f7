//! Book management service.
//!
//! All request validation happens here, before the repository opens a
//! transaction, so simultaneous field errors are reported together.

use validator::Validate;

use crate::{
    error::{AppResult, FieldErrors},
    models::book::{Book, BookQuery, CreateBook, UpdateBook, WriteContext},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        self.repository.books.list(query).await
    }

    pub async fn get(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get(id).await
    }

    /// Create a book. At the top level the `authors` list is required and
    /// must be non-empty; the nested path (embedded book inside an author
    /// write) goes through the resolver instead and skips this rule.
    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        let mut errors = book
            .validate()
            .err()
            .map(FieldErrors::from)
            .unwrap_or_default();
        if book.authors.is_empty() {
            errors.push("authors", "This field is required.");
        }
        errors.into_result()?;

        self.repository.books.create(&book, WriteContext::TopLevel).await
    }

    /// Update a book (PUT and PATCH share these semantics). An explicit
    /// empty `authors` list is rejected: a book keeps at least one author.
    pub async fn update(&self, id: i64, update: UpdateBook) -> AppResult<Book> {
        let mut errors = update
            .validate()
            .err()
            .map(FieldErrors::from)
            .unwrap_or_default();
        if matches!(update.authors.as_deref(), Some([])) {
            errors.push("authors", "must contain at least one entry");
        }
        errors.into_result()?;

        self.repository.books.update(id, &update).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}
