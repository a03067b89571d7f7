//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, copies, genres, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Booksys API",
        version = "1.0.0",
        description = "Library catalog REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Genres
        genres::list_genres,
        genres::create_genre,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::patch_author,
        authors::delete_author,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::patch_book,
        books::delete_book,
        // Copies
        copies::list_copies,
        copies::get_copy,
        copies::create_copy,
        copies::replace_copy,
        copies::patch_copy,
        copies::delete_copy,
    ),
    components(
        schemas(
            // Genres
            crate::models::genre::Genre,
            crate::models::genre::CreateGenre,
            // Authors
            crate::models::author::Author,
            crate::models::author::BookCredit,
            crate::models::author::BookEntry,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            // Books
            crate::models::book::Book,
            crate::models::book::AuthorCredit,
            crate::models::book::AuthorEntry,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Copies
            crate::models::copy::Copy,
            crate::models::copy::BookSummary,
            crate::models::copy::CopySummary,
            crate::models::copy::CreateCopy,
            crate::models::copy::UpdateCopy,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "genres", description = "Genre management"),
        (name = "authors", description = "Author management"),
        (name = "books", description = "Book catalog management"),
        (name = "copies", description = "Physical copy tracking and lending")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
