//! Business logic services

pub mod authors;
pub mod books;
pub mod copies;
pub mod genres;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub genres: genres::GenresService,
    pub authors: authors::AuthorsService,
    pub books: books::BooksService,
    pub copies: copies::CopiesService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            genres: genres::GenresService::new(repository.clone()),
            authors: authors::AuthorsService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            copies: copies::CopiesService::new(repository),
        }
    }
}
