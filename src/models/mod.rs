//! Data models for Booksys

pub mod author;
pub mod book;
pub mod copy;
pub mod genre;
pub mod reference;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, WriteContext};
pub use genre::Genre;
pub use reference::EntityRef;
