use anyhow::{bail, Context};
use reqwest::{Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;

use crate::api::{is_book_not_found_message, Book, BookId, BookPatch, NewBook, ResponseEnvelope};

pub struct BookInventoryClient {
    url: String,
    client: ClientWithMiddleware,
}

/// Error message carried by a failed response, empty if the body is not an envelope
async fn error_message(response: Response) -> String {
    response
        .json::<ResponseEnvelope<String>>()
        .await
        .map(|envelope| envelope.data)
        .unwrap_or_default()
}

async fn read_data<T: DeserializeOwned>(response: Response) -> anyhow::Result<T> {
    let envelope: ResponseEnvelope<T> = response
        .json()
        .await
        .context("Failed to decode response envelope")?;
    Ok(envelope.data)
}

impl BookInventoryClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(2);
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// Calls GET /ping endpoint
    pub async fn ping(&self) -> anyhow::Result<()> {
        let response = self
            .client
            .get(format!("{}/ping", self.url))
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Ping failed with status {}", response.status())
        }
        Ok(())
    }

    /// Calls POST /books endpoint
    /// Returns the created book with id and timestamps assigned
    pub async fn add_book(&self, new_book: NewBook) -> anyhow::Result<Book> {
        let response = self
            .client
            .post(format!("{}/books", self.url))
            .json(&new_book)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Failed to add book {}", error_message(response).await)
        }
        read_data(response).await
    }

    /// Calls GET /books/{book_id} endpoint
    /// Returns None if book was not in the inventory
    /// and error in case of any other failure
    pub async fn get_book(&self, book_id: BookId) -> anyhow::Result<Option<Book>> {
        let response = self
            .client
            .get(format!("{}/books/{}", self.url, book_id))
            .send()
            .await?;
        self.optional_book(response, "get").await
    }

    /// Calls GET /books endpoint with given query parameters
    pub async fn list_books(&self, params: &[(&str, &str)]) -> anyhow::Result<Vec<Book>> {
        let response = self
            .client
            .get(format!("{}/books", self.url))
            .query(params)
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Failed to list books {}", error_message(response).await)
        }
        read_data(response).await
    }

    /// Calls PUT /books/{book_id} endpoint
    /// Returns None if book was not in the inventory
    pub async fn replace_book(
        &self,
        book_id: BookId,
        replacement: NewBook,
    ) -> anyhow::Result<Option<Book>> {
        let response = self
            .client
            .put(format!("{}/books/{}", self.url, book_id))
            .json(&replacement)
            .send()
            .await?;
        self.optional_book(response, "replace").await
    }

    /// Calls PATCH /books/{book_id} endpoint
    /// Returns None if book was not in the inventory
    pub async fn patch_book(
        &self,
        book_id: BookId,
        patch: BookPatch,
    ) -> anyhow::Result<Option<Book>> {
        let response = self
            .client
            .patch(format!("{}/books/{}", self.url, book_id))
            .json(&patch)
            .send()
            .await?;
        self.optional_book(response, "patch").await
    }

    /// Calls DELETE /books/{book_id} endpoint
    /// Returns true if deleted and false if book was not in the inventory
    pub async fn delete_book(&self, book_id: BookId) -> anyhow::Result<bool> {
        let response = self
            .client
            .delete(format!("{}/books/{}", self.url, book_id))
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(true);
        }
        let status = response.status();
        let message = error_message(response).await;
        if status == StatusCode::BAD_REQUEST && is_book_not_found_message(&message) {
            Ok(false)
        } else {
            bail!("Failed to delete book {}", message)
        }
    }

    // The service answers unknown books with 400, as it does invalid requests
    async fn optional_book(
        &self,
        response: Response,
        operation: &str,
    ) -> anyhow::Result<Option<Book>> {
        if response.status().is_success() {
            return Ok(Some(read_data(response).await?));
        }
        let status = response.status();
        let message = error_message(response).await;
        if status == StatusCode::BAD_REQUEST && is_book_not_found_message(&message) {
            Ok(None)
        } else {
            bail!("Failed to {} book {}", operation, message)
        }
    }
}
