//! Authors repository for database operations.
//!
//! Author writes and their book links share one transaction. Deleting an
//! author that is still linked to a book is refused (restrict), while book
//! deletion cascades over the links.

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorQuery, BookCredit, CreateAuthor, UpdateAuthor},
        book::WriteContext,
    },
};

use super::{order_clause, resolve, sql_literal};

const AUTHOR_COLUMNS: &str = r#"
    a.id, a.name, a.introduction, a.place_of_origin,
    (SELECT AVG(b.rating) FROM book_authors ba JOIN books b ON b.id = ba.book_id
     WHERE ba.author_id = a.id) AS avg_rating
"#;

/// Insert an author and one link row per `books[]` entry on the given
/// transaction connection. Embedded book objects are created through the
/// resolver with the nested context, so they need no `authors` of their own.
async fn insert_author(conn: &mut PgConnection, author: &CreateAuthor) -> AppResult<i64> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE name = $1)")
        .bind(&author.name)
        .fetch_one(&mut *conn)
        .await?;
    if exists {
        return Err(AppError::field(
            "name",
            "an author with this name already exists",
        ));
    }

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO authors (name, introduction, place_of_origin) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&author.name)
    .bind(&author.introduction)
    .bind(&author.place_of_origin)
    .fetch_one(&mut *conn)
    .await?;

    for entry in &author.books {
        let book_id =
            resolve::resolve_book(conn, "books", &entry.book, WriteContext::NestedInAuthor).await?;
        super::books::link_author(conn, book_id, id, &entry.role).await?;
    }

    Ok(id)
}

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List authors with the optional role filter and ordering
    pub async fn list(&self, query: &AuthorQuery) -> AppResult<Vec<Author>> {
        let mut conditions = vec!["1=1".to_string()];

        if let Some(ref role) = query.role {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM book_authors ba \
                 WHERE ba.author_id = a.id AND LOWER(ba.role) = LOWER({}))",
                sql_literal(role)
            ));
        }

        let ordering = query
            .ordering
            .as_deref()
            .and_then(order_clause)
            .unwrap_or_default();

        let select = format!(
            "SELECT {} FROM authors a WHERE {} {}",
            AUTHOR_COLUMNS,
            conditions.join(" AND "),
            ordering
        );

        let mut authors = sqlx::query_as::<_, Author>(&select)
            .fetch_all(&self.pool)
            .await?;

        for author in &mut authors {
            self.load_relations(author).await?;
        }

        Ok(authors)
    }

    /// Get an author by id with book credits and average rating
    pub async fn get(&self, id: i64) -> AppResult<Author> {
        let select = format!("SELECT {} FROM authors a WHERE a.id = $1", AUTHOR_COLUMNS);

        let mut author = sqlx::query_as::<_, Author>(&select)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))?;

        self.load_relations(&mut author).await?;
        Ok(author)
    }

    /// Create an author with its book links in one transaction
    pub async fn create(&self, author: &CreateAuthor) -> AppResult<Author> {
        let mut tx = self.pool.begin().await?;
        let id = insert_author(&mut tx, author).await?;
        tx.commit().await?;
        self.get(id).await
    }

    /// Update an author. Scalar fields present in the request are updated;
    /// a present `books` list deletes and recreates all book links.
    pub async fn update(&self, id: i64, update: &UpdateAuthor) -> AppResult<Author> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }

        if let Some(ref name) = update.name {
            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM authors WHERE name = $1 AND id != $2)",
            )
            .bind(name)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
            if taken {
                return Err(AppError::field(
                    "name",
                    "an author with this name already exists",
                ));
            }
        }

        sqlx::query(
            r#"
            UPDATE authors SET
                name = COALESCE($1, name),
                introduction = COALESCE($2, introduction),
                place_of_origin = COALESCE($3, place_of_origin)
            WHERE id = $4
            "#,
        )
        .bind(update.name.as_deref())
        .bind(update.introduction.as_deref())
        .bind(update.place_of_origin.as_deref())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(ref books) = update.books {
            sqlx::query("DELETE FROM book_authors WHERE author_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for entry in books {
                let book_id =
                    resolve::resolve_book(&mut tx, "books", &entry.book, WriteContext::NestedInAuthor)
                        .await?;
                super::books::link_author(&mut tx, book_id, id, &entry.role).await?;
            }
        }

        tx.commit().await?;
        self.get(id).await
    }

    /// Delete an author; refused while book links exist
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let linked: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_authors WHERE author_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if linked > 0 {
            return Err(AppError::Conflict(format!(
                "Author is still linked to {} book(s)",
                linked
            )));
        }

        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        Ok(())
    }

    /// Load book credits and round the average rating to 2 decimal places
    async fn load_relations(&self, author: &mut Author) -> AppResult<()> {
        author.books = sqlx::query_as::<_, BookCredit>(
            r#"
            SELECT b.title AS book, ba.role FROM book_authors ba
            JOIN books b ON b.id = ba.book_id
            WHERE ba.author_id = $1
            ORDER BY b.title
            "#,
        )
        .bind(author.id)
        .fetch_all(&self.pool)
        .await?;

        author.avg_rating = author.avg_rating.map(round_rating);
        Ok(())
    }
}

/// Round an average rating to 2 decimal places for the read representation.
fn round_rating(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_rating_rounds_to_two_decimals() {
        assert_eq!(round_rating(4.666666666), 4.67);
        assert_eq!(round_rating(3.125), 3.13);
        assert_eq!(round_rating(5.0), 5.0);
        assert_eq!(round_rating(0.004), 0.0);
    }
}
