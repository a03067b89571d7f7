//! Genres repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::genre::{CreateGenre, Genre},
};

#[derive(Clone)]
pub struct GenresRepository {
    pool: Pool<Postgres>,
}

impl GenresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all genres
    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    /// Create a genre; the name must be unused
    pub async fn create(&self, genre: &CreateGenre) -> AppResult<Genre> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM genres WHERE name = $1)")
            .bind(&genre.name)
            .fetch_one(&self.pool)
            .await?;
        if exists {
            return Err(AppError::field(
                "name",
                "a genre with this name already exists",
            ));
        }

        let created =
            sqlx::query_as::<_, Genre>("INSERT INTO genres (name) VALUES ($1) RETURNING id, name")
                .bind(&genre.name)
                .fetch_one(&self.pool)
                .await?;
        Ok(created)
    }
}
