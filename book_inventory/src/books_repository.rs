pub use in_memory_books_repository::InMemoryBookRepository;
pub use postgres_books_repository::{PostgresBooksRepository, PostgresBooksRepositoryConfig};

use crate::api::{Book, BookId, NewBook};
use crate::book_filter::BookFilter;
use crate::book_patch::BookUpdate;

mod in_memory_books_repository;
mod postgres_books_repository;

#[derive(thiserror::Error, Debug)]
pub enum BookRepositoryError {
    #[error("Book {0} not found")]
    NotFound(BookId),

    #[error("Book with isbn {0} already exists")]
    DuplicateIsbn(String),

    #[error("Database failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait BookRepository: Send + Sync {
    /// Adds book to repository, returns the stored book with id and timestamps assigned
    async fn add_book(&self, new_book: NewBook) -> Result<Book, BookRepositoryError>;
    /// Retrieves the book from repository
    async fn get_book(&self, book_id: BookId) -> Result<Book, BookRepositoryError>;
    /// Lists books matching the filter ordered by id
    async fn list_books(&self, filter: &BookFilter) -> Result<Vec<Book>, BookRepositoryError>;
    /// Applies the update, returns number of affected rows (0 if the book does not exist)
    async fn update_book(&self, update: &BookUpdate) -> Result<u64, BookRepositoryError>;
    /// Deletes the book, returns number of affected rows (0 if the book does not exist)
    async fn delete_book(&self, book_id: BookId) -> Result<u64, BookRepositoryError>;
}
