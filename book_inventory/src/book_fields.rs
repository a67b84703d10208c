use crate::api::Book;

/// Closed set of book fields that clients are allowed to filter on and patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookField {
    Author,
    Title,
    Price,
    Isbn,
    Stock,
}

impl BookField {
    pub const ALL: [BookField; 5] = [
        BookField::Author,
        BookField::Title,
        BookField::Price,
        BookField::Isbn,
        BookField::Stock,
    ];

    /// Name of the field in requests and of the column in the `books` table
    pub fn name(self) -> &'static str {
        match self {
            BookField::Author => "author",
            BookField::Title => "title",
            BookField::Price => "price",
            BookField::Isbn => "isbn",
            BookField::Stock => "stock",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, BookField::Price | BookField::Stock)
    }

    /// Parses raw request value into the field type.
    /// Returns None if value cannot be represented by the field
    pub fn parse_value(self, raw: &str) -> Option<FieldValue> {
        if self.is_numeric() {
            raw.trim().parse().ok().map(FieldValue::Integer)
        } else {
            Some(FieldValue::Text(raw.to_string()))
        }
    }

    pub fn value_of(self, book: &Book) -> FieldValue {
        match self {
            BookField::Author => FieldValue::Text(book.author.clone()),
            BookField::Title => FieldValue::Text(book.title.clone()),
            BookField::Price => FieldValue::Integer(book.price),
            BookField::Isbn => FieldValue::Text(book.isbn.clone()),
            BookField::Stock => FieldValue::Integer(book.stock),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
}

impl FieldValue {
    /// Empty string and zero mean "not provided" for both patches and filters
    pub fn is_zero(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Integer(number) => *number == 0,
        }
    }
}

#[cfg(test)]
mod book_fields_tests {
    use super::{BookField, FieldValue};

    #[test]
    fn test_field_names_roundtrip() {
        for field in BookField::ALL {
            assert_eq!(BookField::from_name(field.name()), Some(field));
        }
        assert_eq!(BookField::from_name("created_at"), None);
        assert_eq!(BookField::from_name("Author"), None);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(
            BookField::Price.parse_value(" 42"),
            Some(FieldValue::Integer(42))
        );
        assert_eq!(BookField::Stock.parse_value("many"), None);
        assert_eq!(
            BookField::Title.parse_value("42"),
            Some(FieldValue::Text("42".to_string()))
        );
    }

    #[test]
    fn test_zero_values() {
        assert!(FieldValue::Text(String::new()).is_zero());
        assert!(FieldValue::Integer(0).is_zero());
        assert!(!FieldValue::Text(" ".to_string()).is_zero());
        assert!(!FieldValue::Integer(-1).is_zero());
    }
}
