use crate::api::Book;
use crate::book_fields::{BookField, FieldValue};

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equals,
    /// Case sensitive substring match
    Contains,
}

impl Comparison {
    /// Comparison used when filtering on the given field
    pub fn for_field(field: BookField) -> Self {
        match field {
            BookField::Author | BookField::Title => Comparison::Contains,
            BookField::Isbn | BookField::Price | BookField::Stock => Comparison::Equals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    pub field: BookField,
    pub comparison: Comparison,
    pub value: FieldValue,
}

impl FilterCondition {
    pub fn matches(&self, book: &Book) -> bool {
        match (self.comparison, self.field.value_of(book), &self.value) {
            (Comparison::Contains, FieldValue::Text(actual), FieldValue::Text(expected)) => {
                actual.contains(expected.as_str())
            }
            (Comparison::Equals, actual, expected) => &actual == expected,
            _ => false,
        }
    }
}

/// Filter for listing books. All conditions must hold for a book to be listed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFilter {
    pub conditions: Vec<FilterCondition>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for BookFilter {
    fn default() -> Self {
        Self {
            conditions: vec![],
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl BookFilter {
    /// Builds filter out of query parameters.
    /// Parameters other than book fields, `limit` and `offset` are dropped,
    /// as are empty or zero values. When a parameter repeats the last value is used.
    pub fn from_params<'a>(params: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut values: Vec<(BookField, FieldValue)> = vec![];
        let mut limit = None;
        let mut offset = None;

        for (name, raw) in params {
            match name {
                "limit" => limit = Some(raw),
                "offset" => offset = Some(raw),
                _ => {
                    let Some(field) = BookField::from_name(name) else {
                        tracing::debug!("Ignoring unknown filter parameter {}", name);
                        continue;
                    };
                    values.retain(|(existing, _)| *existing != field);
                    match field.parse_value(raw) {
                        Some(value) if !value.is_zero() => values.push((field, value)),
                        _ => {}
                    }
                }
            }
        }

        Self {
            conditions: values
                .into_iter()
                .map(|(field, value)| FilterCondition {
                    field,
                    comparison: Comparison::for_field(field),
                    value,
                })
                .collect(),
            limit: resolve_limit(limit.and_then(|raw| raw.trim().parse().ok())),
            offset: resolve_offset(offset.and_then(|raw| raw.trim().parse().ok())),
        }
    }

    pub fn matches(&self, book: &Book) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.matches(book))
    }
}

pub fn resolve_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(limit) if limit > 0 && limit <= MAX_LIMIT => limit,
        _ => DEFAULT_LIMIT,
    }
}

pub fn resolve_offset(offset: Option<i64>) -> i64 {
    offset.filter(|offset| *offset >= 0).unwrap_or_default()
}
