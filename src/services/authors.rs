//! Author management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, AuthorQuery, CreateAuthor, UpdateAuthor},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &AuthorQuery) -> AppResult<Vec<Author>> {
        self.repository.authors.list(query).await
    }

    pub async fn get(&self, id: i64) -> AppResult<Author> {
        self.repository.authors.get(id).await
    }

    /// Create an author together with its `books[]` links. Embedded book
    /// objects are created without an `authors` list of their own — this
    /// author becomes their implicit author through the link rows.
    pub async fn create(&self, author: CreateAuthor) -> AppResult<Author> {
        author
            .validate()
            .map_err(|e| AppError::Validation(e.into()))?;
        self.repository.authors.create(&author).await
    }

    /// Update an author (PUT and PATCH share these semantics)
    pub async fn update(&self, id: i64, update: UpdateAuthor) -> AppResult<Author> {
        update
            .validate()
            .map_err(|e| AppError::Validation(e.into()))?;
        self.repository.authors.update(id, &update).await
    }

    /// Delete an author; fails with a conflict while book links remain
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }
}
