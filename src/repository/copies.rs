//! Copies repository for database operations.
//!
//! A copy may reference a book through the polymorphic resolver or stand
//! alone (orphaned copies are allowed). Copies mutate independently of
//! their book.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::WriteContext,
        copy::{BookSummary, Copy, CopyQuery, CreateCopy, UpdateCopy},
    },
};

use super::{order_clause, resolve, sql_literal};

const COPY_COLUMNS: &str = "c.id, c.book_id, c.lent, c.lent_by, c.return_date";

#[derive(Clone)]
pub struct CopiesRepository {
    pool: Pool<Postgres>,
}

impl CopiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List copies with the optional book/genre/lent filters and ordering
    pub async fn list(&self, query: &CopyQuery) -> AppResult<Vec<Copy>> {
        let mut conditions = vec!["1=1".to_string()];

        if let Some(ref title) = query.book {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM books b \
                 WHERE b.id = c.book_id AND LOWER(b.title) = LOWER({}))",
                sql_literal(title)
            ));
        }

        if let Some(ref genre) = query.genre {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM book_genres bg JOIN genres g ON g.id = bg.genre_id \
                 WHERE bg.book_id = c.book_id AND LOWER(g.name) = LOWER({}))",
                sql_literal(genre)
            ));
        }

        if let Some(ref lent) = query.lent {
            if lent.eq_ignore_ascii_case("true") {
                conditions.push("c.lent = TRUE".to_string());
            } else if lent.eq_ignore_ascii_case("false") {
                conditions.push("c.lent = FALSE".to_string());
            }
        }

        let ordering = query
            .ordering
            .as_deref()
            .and_then(order_clause)
            .unwrap_or_default();

        let select = format!(
            "SELECT {} FROM copies c WHERE {} {}",
            COPY_COLUMNS,
            conditions.join(" AND "),
            ordering
        );

        let mut copies = sqlx::query_as::<_, Copy>(&select)
            .fetch_all(&self.pool)
            .await?;

        for copy in &mut copies {
            self.load_book(copy).await?;
        }

        Ok(copies)
    }

    /// Get a copy by id with its book summary
    pub async fn get(&self, id: i64) -> AppResult<Copy> {
        let select = format!("SELECT {} FROM copies c WHERE c.id = $1", COPY_COLUMNS);

        let mut copy = sqlx::query_as::<_, Copy>(&select)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", id)))?;

        self.load_book(&mut copy).await?;
        Ok(copy)
    }

    /// Create a copy, resolving the book reference when present
    pub async fn create(&self, copy: &CreateCopy) -> AppResult<Copy> {
        let mut tx = self.pool.begin().await?;

        let book_id = match &copy.book {
            Some(reference) => {
                Some(resolve::resolve_book(&mut tx, "book", reference, WriteContext::TopLevel).await?)
            }
            None => None,
        };

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO copies (book_id, lent, lent_by, return_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(book_id)
        .bind(copy.lent)
        .bind(&copy.lent_by)
        .bind(copy.return_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Replace a copy (PUT): the payload is the full new state, an absent
    /// book reference detaches the copy from its book.
    pub async fn replace(&self, id: i64, copy: &CreateCopy) -> AppResult<Copy> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM copies WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Copy with id {} not found", id)));
        }

        let book_id = match &copy.book {
            Some(reference) => {
                Some(resolve::resolve_book(&mut tx, "book", reference, WriteContext::TopLevel).await?)
            }
            None => None,
        };

        sqlx::query(
            "UPDATE copies SET book_id = $1, lent = $2, lent_by = $3, return_date = $4 WHERE id = $5",
        )
        .bind(book_id)
        .bind(copy.lent)
        .bind(&copy.lent_by)
        .bind(copy.return_date)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Partially update a copy: absent fields keep their stored values,
    /// explicit nulls clear them (a null book detaches the copy)
    pub async fn patch(&self, id: i64, update: &UpdateCopy) -> AppResult<Copy> {
        let mut tx = self.pool.begin().await?;

        let select = format!("SELECT {} FROM copies c WHERE c.id = $1", COPY_COLUMNS);
        let existing = sqlx::query_as::<_, Copy>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", id)))?;

        let book_id = match &update.book {
            Some(Some(reference)) => {
                Some(resolve::resolve_book(&mut tx, "book", reference, WriteContext::TopLevel).await?)
            }
            // Explicit null detaches the copy from its book
            Some(None) => None,
            None => existing.book_id,
        };
        let lent = update.lent.unwrap_or(existing.lent);
        let lent_by = match update.lent_by.clone() {
            Some(value) => value,
            None => existing.lent_by,
        };
        let return_date = match update.return_date {
            Some(value) => value,
            None => existing.return_date,
        };

        sqlx::query(
            "UPDATE copies SET book_id = $1, lent = $2, lent_by = $3, return_date = $4 WHERE id = $5",
        )
        .bind(book_id)
        .bind(lent)
        .bind(&lent_by)
        .bind(return_date)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Delete a copy
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM copies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Copy with id {} not found", id)));
        }
        Ok(())
    }

    /// Load the reduced book view for a copy that references one
    async fn load_book(&self, copy: &mut Copy) -> AppResult<()> {
        let Some(book_id) = copy.book_id else {
            return Ok(());
        };

        let summary = sqlx::query_as::<_, BookSummary>(
            "SELECT title, rating FROM books WHERE id = $1",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(mut summary) = summary {
            summary.genres = sqlx::query_scalar::<_, String>(
                r#"
                SELECT g.name FROM book_genres bg
                JOIN genres g ON g.id = bg.genre_id
                WHERE bg.book_id = $1
                ORDER BY g.name
                "#,
            )
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;
            copy.book = Some(summary);
        }

        Ok(())
    }
}
