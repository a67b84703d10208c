use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::api::{current_timestamp, Book, BookId, NewBook};
use crate::book_fields::{BookField, FieldValue};
use crate::book_filter::BookFilter;
use crate::book_patch::{Assignment, BookUpdate};
use crate::books_repository::{BookRepository, BookRepositoryError};

#[derive(Default)]
pub struct InMemoryBookRepository {
    book_sequence_generator: AtomicI64,
    books: parking_lot::RwLock<BTreeMap<BookId, Book>>,
}

fn isbn_taken(books: &BTreeMap<BookId, Book>, isbn: &str, except: Option<BookId>) -> bool {
    books
        .values()
        .any(|book| book.isbn == isbn && Some(book.id) != except)
}

#[async_trait::async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn add_book(&self, new_book: NewBook) -> Result<Book, BookRepositoryError> {
        let mut locked_books = self.books.write();
        if isbn_taken(&locked_books, &new_book.isbn, None) {
            return Err(BookRepositoryError::DuplicateIsbn(new_book.isbn));
        }

        let id = self.book_sequence_generator.fetch_add(1, Ordering::Relaxed) + 1;
        let created_at = current_timestamp();
        let book = Book {
            id,
            author: new_book.author,
            title: new_book.title,
            price: new_book.price,
            isbn: new_book.isbn,
            stock: new_book.stock,
            created_at,
            updated_at: created_at,
        };
        locked_books.insert(id, book.clone());
        Ok(book)
    }

    async fn get_book(&self, book_id: BookId) -> Result<Book, BookRepositoryError> {
        self.books
            .read()
            .get(&book_id)
            .cloned()
            .ok_or(BookRepositoryError::NotFound(book_id))
    }

    async fn list_books(&self, filter: &BookFilter) -> Result<Vec<Book>, BookRepositoryError> {
        Ok(self
            .books
            .read()
            .values()
            .filter(|book| filter.matches(book))
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    async fn update_book(&self, update: &BookUpdate) -> Result<u64, BookRepositoryError> {
        let mut locked_books = self.books.write();
        if !locked_books.contains_key(&update.book_id) {
            return Ok(0);
        }

        for assignment in &update.assignments {
            if let Assignment::Field(BookField::Isbn, FieldValue::Text(isbn)) = assignment {
                if isbn_taken(&locked_books, isbn, Some(update.book_id)) {
                    return Err(BookRepositoryError::DuplicateIsbn(isbn.clone()));
                }
            }
        }

        match locked_books.get_mut(&update.book_id) {
            Some(book) => {
                update.apply_to(book);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_book(&self, book_id: BookId) -> Result<u64, BookRepositoryError> {
        Ok(self.books.write().remove(&book_id).map_or(0, |_| 1))
    }
}
