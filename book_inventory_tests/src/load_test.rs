use rand::prelude::SliceRandom;
use rand::{thread_rng, Rng};

use book_inventory::api::{BookPatch, NewBook};
use book_inventory::client::BookInventoryClient;

use crate::service_url;

#[tokio::test]
async fn generate_lots_of_books_and_patch_them() {
    const NO_OF_BOOKS_TO_GENERATE: usize = 200;
    const NO_OF_PATCHES: usize = 500;

    let mut rng = thread_rng();
    let client = BookInventoryClient::new(&service_url()).expect("Failed to create client");

    let run_id: u32 = rng.gen();
    let books = generate_books(&mut rng, NO_OF_BOOKS_TO_GENERATE, run_id);

    let mut book_ids = vec![];
    for book in books {
        let book = client.add_book(book).await.expect("Failed to add book");
        book_ids.push(book.id);
        println!("Added book {}", book.id);
    }

    for _ in 0..NO_OF_PATCHES {
        let book_id = *book_ids.choose(&mut rng).unwrap();
        let patch = BookPatch {
            price: Some(rng.gen_range(1..10_000)),
            stock: Some(rng.gen_range(1..100)),
            ..BookPatch::default()
        };
        let patched = client
            .patch_book(book_id, patch.clone())
            .await
            .expect("Failed to patch book")
            .expect("Patched book not found");
        assert_eq!(Some(patched.price), patch.price);
        assert_eq!(Some(patched.stock), patch.stock);
        println!("Patched book {}", book_id);
    }

    let run_marker = format!("(run {})", run_id);
    let listed = client
        .list_books(&[("title", run_marker.as_str()), ("limit", "1000")])
        .await
        .expect("Failed to list books");
    assert_eq!(listed.len(), NO_OF_BOOKS_TO_GENERATE);
}

fn generate_books(
    rng: &mut impl Rng,
    no_of_books_to_generate: usize,
    run_id: u32,
) -> Vec<NewBook> {
    (0..no_of_books_to_generate)
        .map(|no| NewBook {
            author: format!(
                "{} {}",
                FIRST_NAMES.choose(rng).unwrap(),
                LAST_NAMES.choose(rng).unwrap()
            ),
            title: format!("A tale of number {} (run {})", no, run_id),
            price: rng.gen_range(1..10_000),
            isbn: format!("978-{}-{}", run_id, no),
            stock: rng.gen_range(0..50),
        })
        .collect()
}

const FIRST_NAMES: [&str; 12] = [
    "Ryan", "Dorothy", "Jacob", "Amy", "Nicholas", "Kathleen", "Gary", "Angela", "Eric",
    "Shirley", "Jonathan", "Emma",
];

const LAST_NAMES: [&str; 12] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez",
];
