use std::time::UNIX_EPOCH;

use book_inventory::api::{BookPatch, NewBook};
use book_inventory::client::BookInventoryClient;

use crate::service_url;

fn unique_suffix() -> String {
    format!(
        "{}",
        std::time::SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    )
}

#[tokio::test]
/// Simple test for book inventory
/// Creates a book
/// Gets the book
/// Patches the book
/// Replaces the book
/// Lists books and checks if the book is there
/// Deletes the book
async fn book_inventory_e2e_test() {
    let client = BookInventoryClient::new(&service_url()).expect("Failed to create client");
    client.ping().await.expect("Service not responding");

    let suffix = unique_suffix();
    let new_book = NewBook {
        author: format!("Author {}", suffix),
        title: "Title1".to_string(),
        price: 100,
        isbn: format!("ISBN-{}", suffix),
        stock: 5,
    };

    let book = client
        .add_book(new_book.clone())
        .await
        .expect("Failed to add book");
    assert!(book.id > 0);
    assert_eq!(book.created_at, book.updated_at);

    let returned_book = client
        .get_book(book.id)
        .await
        .expect("Failed to get book")
        .expect("Book not found");
    assert_eq!(returned_book, book);

    let patched_book = client
        .patch_book(
            book.id,
            BookPatch {
                price: Some(150),
                ..BookPatch::default()
            },
        )
        .await
        .expect("Failed to patch book")
        .expect("Book not found");
    assert_eq!(patched_book.price, 150);
    assert_eq!(patched_book.title, book.title);
    assert!(patched_book.updated_at > book.updated_at);

    let replaced_book = client
        .replace_book(
            book.id,
            NewBook {
                title: "Title2".to_string(),
                ..new_book.clone()
            },
        )
        .await
        .expect("Failed to replace book")
        .expect("Book not found");
    assert_eq!(replaced_book.title, "Title2");
    assert_eq!(replaced_book.price, 100);
    assert_eq!(replaced_book.created_at, book.created_at);

    let books = client
        .list_books(&[("author", suffix.as_str()), ("title", "Title2")])
        .await
        .expect("Failed to list books");
    assert_eq!(books, vec![replaced_book]);

    assert!(client
        .delete_book(book.id)
        .await
        .expect("Failed to delete book"));
    assert_eq!(
        client.get_book(book.id).await.expect("Failed to get book"),
        None
    );
    assert!(!client
        .delete_book(book.id)
        .await
        .expect("Failed to delete book"));
}

#[tokio::test]
/// Adds five books of one author and checks if limit is applied to the listing
async fn book_inventory_list_limit_test() {
    let client = BookInventoryClient::new(&service_url()).expect("Failed to create client");
    let suffix = unique_suffix();
    let author = format!("Smith {}", suffix);

    for no in 0..5 {
        client
            .add_book(NewBook {
                author: author.clone(),
                title: format!("Title {}", no),
                price: 10,
                isbn: format!("SMITH-{}-{}", suffix, no),
                stock: 1,
            })
            .await
            .expect("Failed to add book");
    }

    let books = client
        .list_books(&[("author", author.as_str()), ("limit", "2")])
        .await
        .expect("Failed to list books");
    assert_eq!(books.len(), 2);

    let books = client
        .list_books(&[("author", author.as_str()), ("offset", "-5")])
        .await
        .expect("Failed to list books");
    assert_eq!(books.len(), 5);
}

#[tokio::test]
/// Invalid replacement of an existing book is an error, not a missing book
async fn book_inventory_invalid_replacement_test() {
    let client = BookInventoryClient::new(&service_url()).expect("Failed to create client");
    let suffix = unique_suffix();
    let new_book = NewBook {
        author: format!("Author {}", suffix),
        title: "Title1".to_string(),
        price: 100,
        isbn: format!("ISBN-{}", suffix),
        stock: 5,
    };
    let book = client
        .add_book(new_book.clone())
        .await
        .expect("Failed to add book");

    let result = client
        .replace_book(
            book.id,
            NewBook {
                author: "".to_string(),
                ..new_book
            },
        )
        .await;
    assert!(result.is_err());

    assert_eq!(
        client
            .replace_book(
                i64::MAX,
                NewBook {
                    author: "Someone".to_string(),
                    title: "".to_string(),
                    price: 0,
                    isbn: format!("MISSING-{}", suffix),
                    stock: 0,
                },
            )
            .await
            .expect("Failed to replace book"),
        None
    );

    assert!(client
        .delete_book(book.id)
        .await
        .expect("Failed to delete book"));
}
