use chrono::{DateTime, SubsecRound, Utc};
use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

pub type BookId = i64;

/// Returns current time truncated to the precision kept by the database (microseconds),
/// so a book returned by a handler is equal to the one read back later
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Book record as stored in the inventory
pub struct Book {
    pub id: BookId,
    pub author: String,
    pub title: String,
    pub price: i64,
    pub isbn: String,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Body of create and full replace requests. Id and timestamps are assigned by the server
pub struct NewBook {
    pub author: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub stock: i64,
}

impl NewBook {
    pub fn validate(&self) -> Result<(), String> {
        if self.author.trim().is_empty() {
            return Err("Field author is required".to_string());
        }
        if self.isbn.trim().is_empty() {
            return Err("Field isbn is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Struct representing a patch to a book. Allows to specify only a few fields and patch the current book.
/// Unknown fields are ignored, fields set to an empty string or zero are treated as not provided.
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

const NOT_FOUND_SUFFIX: &str = " not found";

/// Error message sent when a book does not exist
pub fn book_not_found_message(book_id: BookId) -> String {
    format!("Book {}{}", book_id, NOT_FOUND_SUFFIX)
}

/// Tells a missing book apart from other 400 answers, which share the status code
pub fn is_book_not_found_message(message: &str) -> bool {
    message
        .strip_prefix("Book ")
        .and_then(|rest| rest.strip_suffix(NOT_FOUND_SUFFIX))
        .map(|book_id| book_id.parse::<BookId>().is_ok())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
/// Uniform body of every response, `data` holds either the payload or an error message
pub struct ResponseEnvelope<T> {
    pub status: u16,
    pub data: T,
}

impl<T> ResponseEnvelope<T> {
    pub fn new(status: u16, data: T) -> Self {
        Self { status, data }
    }
}
