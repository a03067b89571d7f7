//! Books repository for database operations.
//!
//! Nested writes (book row + genre set + author links) run inside one
//! transaction; a failure anywhere rolls the whole write back.

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{AuthorCredit, Book, BookQuery, CreateBook, UpdateBook, WriteContext},
        copy::CopySummary,
    },
};

use super::{order_clause, resolve, sql_literal};

const BOOK_COLUMNS: &str = r#"
    b.id, b.title, b.blurb, b.rating, b.date_published,
    (SELECT COUNT(*) FROM copies c WHERE c.book_id = b.id) AS num_copies
"#;

/// Insert a book with its genre set and author links on the given
/// transaction connection. Shared by the top-level create path and the
/// reference resolver (embedded book objects in author payloads).
pub(crate) async fn insert_book(
    conn: &mut PgConnection,
    book: &CreateBook,
    context: WriteContext,
) -> AppResult<i64> {
    if context == WriteContext::TopLevel && book.authors.is_empty() {
        return Err(AppError::field("authors", "This field is required."));
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE title = $1)")
        .bind(&book.title)
        .fetch_one(&mut *conn)
        .await?;
    if exists {
        return Err(AppError::field(
            "title",
            "a book with this title already exists",
        ));
    }

    let mut genre_ids = Vec::with_capacity(book.genres.len());
    for reference in &book.genres {
        genre_ids.push(resolve::resolve_genre(conn, "genres", reference).await?);
    }

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO books (title, blurb, rating, date_published)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(&book.title)
    .bind(&book.blurb)
    .bind(book.rating)
    .bind(book.date_published)
    .fetch_one(&mut *conn)
    .await?;

    set_genres(conn, id, &genre_ids).await?;

    for entry in &book.authors {
        let author_id = resolve::resolve_author(conn, "authors", &entry.author).await?;
        link_author(conn, id, author_id, &entry.role).await?;
    }

    Ok(id)
}

/// Replace the genre set of a book.
pub(crate) async fn set_genres(
    conn: &mut PgConnection,
    book_id: i64,
    genre_ids: &[i64],
) -> AppResult<()> {
    sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;

    for genre_id in genre_ids {
        sqlx::query(
            "INSERT INTO book_genres (book_id, genre_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(book_id)
        .bind(genre_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Insert one book-author link row. The (book, author) pair is unique; a
/// duplicate surfaces as a store conflict.
pub(crate) async fn link_author(
    conn: &mut PgConnection,
    book_id: i64,
    author_id: i64,
    role: &str,
) -> AppResult<()> {
    sqlx::query("INSERT INTO book_authors (book_id, author_id, role) VALUES ($1, $2, $3)")
        .bind(book_id)
        .bind(author_id)
        .bind(role)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List books with the optional genre/author filters and ordering
    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let mut conditions = vec!["1=1".to_string()];

        if let Some(ref genre) = query.genres {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM book_genres bg JOIN genres g ON g.id = bg.genre_id \
                 WHERE bg.book_id = b.id AND LOWER(g.name) = LOWER({}))",
                sql_literal(genre)
            ));
        }

        if let Some(ref author_name) = query.book_authors {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM book_authors ba JOIN authors a ON a.id = ba.author_id \
                 WHERE ba.book_id = b.id AND LOWER(a.name) = LOWER({}))",
                sql_literal(author_name)
            ));
        }

        let ordering = query
            .ordering
            .as_deref()
            .and_then(order_clause)
            .unwrap_or_default();

        let select = format!(
            "SELECT {} FROM books b WHERE {} {}",
            BOOK_COLUMNS,
            conditions.join(" AND "),
            ordering
        );

        let mut books = sqlx::query_as::<_, Book>(&select)
            .fetch_all(&self.pool)
            .await?;

        for book in &mut books {
            self.load_relations(book).await?;
        }

        Ok(books)
    }

    /// Get a book by id with relations and computed fields
    pub async fn get(&self, id: i64) -> AppResult<Book> {
        let select = format!("SELECT {} FROM books b WHERE b.id = $1", BOOK_COLUMNS);

        let mut book = sqlx::query_as::<_, Book>(&select)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        self.load_relations(&mut book).await?;
        Ok(book)
    }

    /// Create a book with its genres and author links in one transaction
    pub async fn create(&self, book: &CreateBook, context: WriteContext) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;
        let id = insert_book(&mut tx, book, context).await?;
        tx.commit().await?;
        self.get(id).await
    }

    /// Update a book. Scalar fields present in the request are updated; a
    /// present `genres` list replaces the genre set; a present `authors`
    /// list deletes and recreates all author links. Absent fields are left
    /// untouched.
    pub async fn update(&self, id: i64, update: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        if let Some(ref title) = update.title {
            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM books WHERE title = $1 AND id != $2)",
            )
            .bind(title)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
            if taken {
                return Err(AppError::field(
                    "title",
                    "a book with this title already exists",
                ));
            }
        }

        sqlx::query(
            r#"
            UPDATE books SET
                title = COALESCE($1, title),
                blurb = COALESCE($2, blurb),
                rating = COALESCE($3, rating),
                date_published = COALESCE($4, date_published)
            WHERE id = $5
            "#,
        )
        .bind(update.title.as_deref())
        .bind(update.blurb.as_deref())
        .bind(update.rating)
        .bind(update.date_published)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(ref genres) = update.genres {
            let mut genre_ids = Vec::with_capacity(genres.len());
            for reference in genres {
                genre_ids.push(resolve::resolve_genre(&mut tx, "genres", reference).await?);
            }
            set_genres(&mut tx, id, &genre_ids).await?;
        }

        if let Some(ref authors) = update.authors {
            sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for entry in authors {
                let author_id = resolve::resolve_author(&mut tx, "authors", &entry.author).await?;
                link_author(&mut tx, id, author_id, &entry.role).await?;
            }
        }

        tx.commit().await?;
        self.get(id).await
    }

    /// Delete a book; the store cascades its author links and copies
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Load genres, author credits, copies and the coauthors flag
    async fn load_relations(&self, book: &mut Book) -> AppResult<()> {
        book.genres = sqlx::query_scalar::<_, String>(
            r#"
            SELECT g.name FROM book_genres bg
            JOIN genres g ON g.id = bg.genre_id
            WHERE bg.book_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(book.id)
        .fetch_all(&self.pool)
        .await?;

        book.authors = sqlx::query_as::<_, AuthorCredit>(
            r#"
            SELECT a.name AS author, ba.role FROM book_authors ba
            JOIN authors a ON a.id = ba.author_id
            WHERE ba.book_id = $1
            ORDER BY a.name
            "#,
        )
        .bind(book.id)
        .fetch_all(&self.pool)
        .await?;

        book.copies = sqlx::query_as::<_, CopySummary>(
            "SELECT lent, lent_by, return_date FROM copies WHERE book_id = $1 ORDER BY id",
        )
        .bind(book.id)
        .fetch_all(&self.pool)
        .await?;

        book.coauthors = book.authors.len() > 1;
        Ok(())
    }
}
