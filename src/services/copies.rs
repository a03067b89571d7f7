//! Copy management service.
//!
//! Enforces the conditional lending rule: a lent copy must carry both
//! `lent_by` and `return_date`. For PATCH the rule is evaluated against the
//! payload merged over the stored row, so a patch setting `lent = true`
//! without resending `lent_by` only passes when `lent_by` is already stored.

use crate::{
    error::AppResult,
    models::copy::{validate_lending, Copy, CopyQuery, CreateCopy, UpdateCopy},
    repository::Repository,
};

#[derive(Clone)]
pub struct CopiesService {
    repository: Repository,
}

impl CopiesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &CopyQuery) -> AppResult<Vec<Copy>> {
        self.repository.copies.list(query).await
    }

    pub async fn get(&self, id: i64) -> AppResult<Copy> {
        self.repository.copies.get(id).await
    }

    pub async fn create(&self, copy: CreateCopy) -> AppResult<Copy> {
        validate_lending(copy.lent, copy.lent_by.as_deref(), copy.return_date).into_result()?;
        self.repository.copies.create(&copy).await
    }

    /// Replace a copy (PUT); the payload alone is the effective state
    pub async fn replace(&self, id: i64, copy: CreateCopy) -> AppResult<Copy> {
        validate_lending(copy.lent, copy.lent_by.as_deref(), copy.return_date).into_result()?;
        self.repository.copies.replace(id, &copy).await
    }

    /// Partially update a copy (PATCH); absent fields fall back to the
    /// stored row before the lending rule runs, explicit nulls clear
    pub async fn patch(&self, id: i64, update: UpdateCopy) -> AppResult<Copy> {
        let existing = self.repository.copies.get(id).await?;

        let lent = update.lent.unwrap_or(existing.lent);
        let lent_by = match &update.lent_by {
            Some(value) => value.clone(),
            None => existing.lent_by.clone(),
        };
        let return_date = match update.return_date {
            Some(value) => value,
            None => existing.return_date,
        };
        validate_lending(lent, lent_by.as_deref(), return_date).into_result()?;

        self.repository.copies.patch(id, &update).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.copies.delete(id).await
    }
}
