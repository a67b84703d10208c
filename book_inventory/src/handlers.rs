use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::web::{Data, Query};
use actix_web::{Error, HttpRequest, HttpResponse};
use paperclip::actix::{
    api_v2_operation,
    web::{self},
};
use serde::Serialize;

use crate::api::{
    book_not_found_message, current_timestamp, BookId, BookPatch, NewBook, ResponseEnvelope,
};
use crate::book_filter::BookFilter;
use crate::book_patch::{resolve_patch, resolve_replacement, ResolvedUpdate};
use crate::books_repository::{BookRepository, BookRepositoryError};

type BooksRepository = Data<Arc<dyn BookRepository>>;

const STORE_FAILURE_MESSAGE: &str = "Internal server error";

pub(crate) fn respond<T: Serialize>(status: StatusCode, data: T) -> HttpResponse {
    HttpResponse::build(status).json(ResponseEnvelope::new(status.as_u16(), data))
}

fn bad_request(message: impl Into<String>) -> HttpResponse {
    respond(StatusCode::BAD_REQUEST, message.into())
}

fn store_failure(operation: &str, err: BookRepositoryError) -> HttpResponse {
    tracing::error!("{} failed {}", operation, err);
    respond(StatusCode::INTERNAL_SERVER_ERROR, STORE_FAILURE_MESSAGE)
}

/// Maps repository error of an operation on an existing book to a response
fn book_operation_failure(operation: &str, err: BookRepositoryError) -> HttpResponse {
    match err {
        BookRepositoryError::NotFound(book_id) => {
            bad_request(book_not_found_message(book_id))
        }
        err => store_failure(operation, err),
    }
}

/// Book ids are positive integers
fn parse_book_id(raw: &str) -> Result<BookId, HttpResponse> {
    match raw.parse::<BookId>() {
        Ok(book_id) if book_id > 0 => Ok(book_id),
        _ => Err(bad_request(format!("Invalid book id: {}", raw))),
    }
}

/// Answers paths with no matching route
pub async fn unknown_route(request: HttpRequest) -> HttpResponse {
    respond(
        StatusCode::NOT_FOUND,
        format!("No route for {}", request.path()),
    )
}

/// Answers known paths requested with an unsupported method
pub async fn method_not_allowed(request: HttpRequest) -> HttpResponse {
    respond(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Method {} not allowed on {}", request.method(), request.path()),
    )
}

#[api_v2_operation]
pub async fn ping() -> Result<HttpResponse, Error> {
    Ok(respond(StatusCode::OK, "pong"))
}

#[api_v2_operation]
pub async fn get_books(
    books_repository: BooksRepository,
    request: HttpRequest,
) -> Result<HttpResponse, Error> {
    let params = match Query::<Vec<(String, String)>>::from_query(request.query_string()) {
        Ok(params) => params.into_inner(),
        Err(err) => return Ok(bad_request(format!("Invalid query parameters: {}", err))),
    };
    let filter = BookFilter::from_params(
        params
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str())),
    );

    Ok(match books_repository.list_books(&filter).await {
        Ok(books) => respond(StatusCode::OK, books),
        Err(err) => store_failure("List books", err),
    })
}

#[api_v2_operation]
pub async fn add_book(
    books_repository: BooksRepository,
    new_book: web::Json<NewBook>,
) -> Result<HttpResponse, Error> {
    let new_book = new_book.into_inner();
    if let Err(message) = new_book.validate() {
        return Ok(bad_request(message));
    }

    Ok(match books_repository.add_book(new_book).await {
        Ok(book) => {
            tracing::info!("Added book {}", book.id);
            respond(StatusCode::OK, book)
        }
        Err(err) => store_failure("Add book", err),
    })
}

#[api_v2_operation]
pub async fn get_book(
    books_repository: BooksRepository,
    book_id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let book_id = match parse_book_id(&book_id) {
        Ok(book_id) => book_id,
        Err(response) => return Ok(response),
    };

    Ok(match books_repository.get_book(book_id).await {
        Ok(book) => respond(StatusCode::OK, book),
        Err(err) => book_operation_failure("Get book", err),
    })
}

/// Stores resolved update, zero affected rows means the book vanished after it was read
async fn store_update(
    books_repository: &dyn BookRepository,
    operation: &str,
    resolved: ResolvedUpdate,
) -> HttpResponse {
    match books_repository.update_book(&resolved.update).await {
        Ok(0) => bad_request(book_not_found_message(resolved.update.book_id)),
        Ok(_) => respond(StatusCode::OK, resolved.book),
        Err(err) => store_failure(operation, err),
    }
}

#[api_v2_operation]
pub async fn replace_book(
    books_repository: BooksRepository,
    book_id: web::Path<String>,
    replacement: web::Json<NewBook>,
) -> Result<HttpResponse, Error> {
    let book_id = match parse_book_id(&book_id) {
        Ok(book_id) => book_id,
        Err(response) => return Ok(response),
    };
    let replacement = replacement.into_inner();
    if let Err(message) = replacement.validate() {
        return Ok(bad_request(message));
    }

    let current = match books_repository.get_book(book_id).await {
        Ok(book) => book,
        Err(err) => return Ok(book_operation_failure("Replace book", err)),
    };
    let resolved = resolve_replacement(&current, &replacement, current_timestamp());

    Ok(store_update(books_repository.get_ref().as_ref(), "Replace book", resolved).await)
}

#[api_v2_operation]
pub async fn patch_book(
    books_repository: BooksRepository,
    book_id: web::Path<String>,
    patch: web::Json<BookPatch>,
) -> Result<HttpResponse, Error> {
    let book_id = match parse_book_id(&book_id) {
        Ok(book_id) => book_id,
        Err(response) => return Ok(response),
    };

    let current = match books_repository.get_book(book_id).await {
        Ok(book) => book,
        Err(err) => return Ok(book_operation_failure("Patch book", err)),
    };
    let resolved = resolve_patch(&current, &patch, current_timestamp());

    Ok(store_update(books_repository.get_ref().as_ref(), "Patch book", resolved).await)
}

#[api_v2_operation]
pub async fn delete_book(
    books_repository: BooksRepository,
    book_id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let book_id = match parse_book_id(&book_id) {
        Ok(book_id) => book_id,
        Err(response) => return Ok(response),
    };

    Ok(match books_repository.delete_book(book_id).await {
        Ok(0) => bad_request(book_not_found_message(book_id)),
        Ok(_) => {
            tracing::info!("Deleted book {}", book_id);
            respond(StatusCode::OK, format!("Book {} deleted", book_id))
        }
        Err(err) => store_failure("Delete book", err),
    })
}
