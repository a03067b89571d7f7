//! Genre management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::genre::{CreateGenre, Genre},
    repository::Repository,
};

#[derive(Clone)]
pub struct GenresService {
    repository: Repository,
}

impl GenresService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    /// Create a genre; the name must come from the fixed choice set
    pub async fn create(&self, genre: CreateGenre) -> AppResult<Genre> {
        genre
            .validate()
            .map_err(|e| AppError::Validation(e.into()))?;
        self.repository.genres.create(&genre).await
    }
}
