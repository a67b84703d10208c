use chrono::{DateTime, Duration, Utc};

use crate::api::{Book, BookId, BookPatch, NewBook};
use crate::book_fields::{BookField, FieldValue};

/// Single `column = value` pair of an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    Field(BookField, FieldValue),
    UpdatedAt(DateTime<Utc>),
}

impl Assignment {
    pub fn column(&self) -> &'static str {
        match self {
            Assignment::Field(field, _) => field.name(),
            Assignment::UpdatedAt(_) => "updated_at",
        }
    }

    /// Writes the assigned value into the book.
    /// A value of a type not matching the field is ignored
    pub fn apply_to(&self, book: &mut Book) {
        match self {
            Assignment::Field(BookField::Author, FieldValue::Text(value)) => {
                book.author = value.clone()
            }
            Assignment::Field(BookField::Title, FieldValue::Text(value)) => {
                book.title = value.clone()
            }
            Assignment::Field(BookField::Isbn, FieldValue::Text(value)) => {
                book.isbn = value.clone()
            }
            Assignment::Field(BookField::Price, FieldValue::Integer(value)) => book.price = *value,
            Assignment::Field(BookField::Stock, FieldValue::Integer(value)) => book.stock = *value,
            Assignment::Field(..) => {}
            Assignment::UpdatedAt(updated_at) => book.updated_at = *updated_at,
        }
    }
}

/// Update instruction for the store: which columns of which book get which values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookUpdate {
    pub book_id: BookId,
    pub assignments: Vec<Assignment>,
}

impl BookUpdate {
    pub fn apply_to(&self, book: &mut Book) {
        for assignment in &self.assignments {
            assignment.apply_to(book);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUpdate {
    pub update: BookUpdate,
    /// Book as it will look once the update is stored
    pub book: Book,
}

impl BookPatch {
    /// Fields of the patch that carry a value, zero values are skipped
    pub fn provided_fields(&self) -> Vec<(BookField, FieldValue)> {
        let text = |value: &Option<String>| value.clone().map(FieldValue::Text);
        let integer = |value: &Option<i64>| value.map(FieldValue::Integer);

        [
            (BookField::Author, text(&self.author)),
            (BookField::Title, text(&self.title)),
            (BookField::Price, integer(&self.price)),
            (BookField::Isbn, text(&self.isbn)),
            (BookField::Stock, integer(&self.stock)),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .filter(|(_, value)| !value.is_zero())
        .collect()
    }
}

/// updated_at always moves forward, even when the clock did not advance since the last update
fn next_updated_at(current: &Book, now: DateTime<Utc>) -> DateTime<Utc> {
    now.max(current.updated_at + Duration::microseconds(1))
}

/// Resolves a partial update of `current` book.
/// Only fields provided with a non zero value are updated, `updated_at` is always set.
pub fn resolve_patch(current: &Book, patch: &BookPatch, now: DateTime<Utc>) -> ResolvedUpdate {
    let mut assignments: Vec<Assignment> = patch
        .provided_fields()
        .into_iter()
        .map(|(field, value)| Assignment::Field(field, value))
        .collect();
    assignments.push(Assignment::UpdatedAt(next_updated_at(current, now)));

    build(current, assignments)
}

/// Resolves a full replacement of `current` book, every field is overwritten including zero values
pub fn resolve_replacement(
    current: &Book,
    replacement: &NewBook,
    now: DateTime<Utc>,
) -> ResolvedUpdate {
    let assignments = vec![
        Assignment::Field(
            BookField::Author,
            FieldValue::Text(replacement.author.clone()),
        ),
        Assignment::Field(BookField::Title, FieldValue::Text(replacement.title.clone())),
        Assignment::Field(BookField::Price, FieldValue::Integer(replacement.price)),
        Assignment::Field(BookField::Isbn, FieldValue::Text(replacement.isbn.clone())),
        Assignment::Field(BookField::Stock, FieldValue::Integer(replacement.stock)),
        Assignment::UpdatedAt(next_updated_at(current, now)),
    ];

    build(current, assignments)
}

fn build(current: &Book, assignments: Vec<Assignment>) -> ResolvedUpdate {
    let update = BookUpdate {
        book_id: current.id,
        assignments,
    };
    let mut book = current.clone();
    update.apply_to(&mut book);
    ResolvedUpdate { update, book }
}

#[cfg(test)]
mod book_patch_tests {
    use chrono::{Duration, TimeZone, Utc};

    use crate::api::{Book, BookPatch, NewBook};
    use crate::book_fields::{BookField, FieldValue};
    use crate::book_patch::{resolve_patch, resolve_replacement, Assignment};

    fn existing_book() -> Book {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Book {
            id: 7,
            author: "Author".to_string(),
            title: "Title".to_string(),
            price: 100,
            isbn: "X1".to_string(),
            stock: 5,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_patch_overwrites_only_provided_fields() {
        let book = existing_book();
        let now = book.updated_at + Duration::seconds(10);
        let patch = BookPatch {
            price: Some(150),
            title: Some("New title".to_string()),
            ..BookPatch::default()
        };

        let resolved = resolve_patch(&book, &patch, now);

        assert_eq!(
            resolved.book,
            Book {
                price: 150,
                title: "New title".to_string(),
                updated_at: now,
                ..book.clone()
            }
        );
        assert_eq!(resolved.update.book_id, 7);
        assert_eq!(resolved.update.assignments.len(), 3);
        assert!(resolved
            .update
            .assignments
            .contains(&Assignment::Field(BookField::Price, FieldValue::Integer(150))));
        assert!(resolved
            .update
            .assignments
            .contains(&Assignment::UpdatedAt(now)));
    }

    #[test]
    fn test_zero_values_are_treated_as_absent() {
        let book = existing_book();
        let now = book.updated_at + Duration::seconds(1);
        let patch = BookPatch {
            author: Some("".to_string()),
            price: Some(0),
            stock: Some(0),
            isbn: None,
            title: Some("".to_string()),
        };

        let resolved = resolve_patch(&book, &patch, now);

        let columns: Vec<_> = resolved
            .update
            .assignments
            .iter()
            .map(Assignment::column)
            .collect();
        assert_eq!(columns, vec!["updated_at"]);
        assert_eq!(
            resolved.book,
            Book {
                updated_at: now,
                ..book
            }
        );
    }

    #[test]
    fn test_unknown_keys_have_no_effect() {
        let book = existing_book();
        let now = book.updated_at + Duration::seconds(1);
        let with_unknown: BookPatch =
            serde_json::from_str(r#"{"stock": 3, "id": 99, "created_at": "x", "color": "red"}"#)
                .unwrap();
        let without_unknown = BookPatch {
            stock: Some(3),
            ..BookPatch::default()
        };

        assert_eq!(
            resolve_patch(&book, &with_unknown, now),
            resolve_patch(&book, &without_unknown, now)
        );
    }

    #[test]
    fn test_updated_at_always_advances() {
        let book = existing_book();
        let clock_behind = book.updated_at - Duration::seconds(5);

        let resolved = resolve_patch(&book, &BookPatch::default(), clock_behind);

        assert!(resolved.book.updated_at > book.updated_at);
        assert_eq!(resolved.book.created_at, book.created_at);
    }

    #[test]
    fn test_replacement_overwrites_every_field() {
        let book = existing_book();
        let now = book.updated_at + Duration::seconds(1);
        let replacement = NewBook {
            author: "Other".to_string(),
            title: "".to_string(),
            price: 0,
            isbn: "X2".to_string(),
            stock: 0,
        };

        let resolved = resolve_replacement(&book, &replacement, now);

        assert_eq!(
            resolved.book,
            Book {
                id: 7,
                author: "Other".to_string(),
                title: "".to_string(),
                price: 0,
                isbn: "X2".to_string(),
                stock: 0,
                created_at: book.created_at,
                updated_at: now,
            }
        );
        assert_eq!(resolved.update.assignments.len(), 6);
    }
}
