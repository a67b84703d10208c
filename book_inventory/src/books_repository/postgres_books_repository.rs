use anyhow::Context;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row, Statement};

use crate::api::{current_timestamp, Book, BookId, NewBook};
use crate::book_fields::{BookField, FieldValue};
use crate::book_filter::{BookFilter, Comparison};
use crate::book_patch::{Assignment, BookUpdate};
use crate::books_repository::{BookRepository, BookRepositoryError};

const BOOK_COLUMNS: &str = "id, author, title, price, isbn, stock, created_at, updated_at";

pub struct PostgresBooksRepository {
    client: Client,
}

pub struct PostgresBooksRepositoryConfig {
    pub hostname: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl PostgresBooksRepositoryConfig {
    fn connection_str(&self, password: &str) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, password, self.hostname, self.port, self.database
        )
    }
}

impl PostgresBooksRepository {
    pub async fn init(config: PostgresBooksRepositoryConfig) -> anyhow::Result<Self> {
        tracing::info!("Postgres connection_str: {}", config.connection_str("****"));
        let (client, connection) =
            tokio_postgres::connect(&config.connection_str(&config.password), NoTls)
                .await
                .context("Failed to start postgres")?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("Postgres connection error: {}", e);
            }
        });

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS books (
            id              BIGSERIAL PRIMARY KEY,
            author          TEXT NOT NULL,
            title           TEXT NOT NULL,
            price           BIGINT NOT NULL,
            isbn            TEXT NOT NULL UNIQUE,
            stock           BIGINT NOT NULL,
            created_at      TIMESTAMPTZ NOT NULL,
            updated_at      TIMESTAMPTZ NOT NULL
            )
        ",
            )
            .await
            .context("Failed to setup table")?;
        Ok(Self { client })
    }
}

fn book_from_row(row: &Row) -> Result<Book, tokio_postgres::Error> {
    Ok(Book {
        id: row.try_get("id")?,
        author: row.try_get("author")?,
        title: row.try_get("title")?,
        price: row.try_get("price")?,
        isbn: row.try_get("isbn")?,
        stock: row.try_get("stock")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn sql_value(value: &FieldValue) -> &(dyn ToSql + Sync) {
    match value {
        FieldValue::Text(text) => text as &(dyn ToSql + Sync),
        FieldValue::Integer(number) => number as &(dyn ToSql + Sync),
    }
}

fn is_unique_violation(err: &tokio_postgres::Error) -> bool {
    err.as_db_error()
        .map(|db_err| db_err.code() == &SqlState::UNIQUE_VIOLATION)
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl BookRepository for PostgresBooksRepository {
    async fn add_book(&self, new_book: NewBook) -> Result<Book, BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "INSERT INTO books (author, title, price, isbn, stock, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING id",
            )
            .await?;

        let created_at = current_timestamp();
        let rows = self
            .client
            .query(
                &stmt,
                &[
                    &new_book.author,
                    &new_book.title,
                    &new_book.price,
                    &new_book.isbn,
                    &new_book.stock,
                    &created_at,
                ],
            )
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    BookRepositoryError::DuplicateIsbn(new_book.isbn.clone())
                } else {
                    err.into()
                }
            })?;

        let book_id: BookId = rows
            .first()
            .ok_or_else(|| BookRepositoryError::Other("Id not returned".to_string()))?
            .try_get(0)?;

        Ok(Book {
            id: book_id,
            author: new_book.author,
            title: new_book.title,
            price: new_book.price,
            isbn: new_book.isbn,
            stock: new_book.stock,
            created_at,
            updated_at: created_at,
        })
    }

    async fn get_book(&self, book_id: BookId) -> Result<Book, BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(&format!("SELECT {} FROM books WHERE id = ($1)", BOOK_COLUMNS))
            .await?;

        let rows = self.client.query(&stmt, &[&book_id]).await?;

        let row = rows
            .first()
            .ok_or_else(|| BookRepositoryError::NotFound(book_id))?;

        Ok(book_from_row(row)?)
    }

    async fn list_books(&self, filter: &BookFilter) -> Result<Vec<Book>, BookRepositoryError> {
        let mut params: Vec<&(dyn ToSql + Sync)> = vec![];
        let mut conditions = vec![];

        for condition in &filter.conditions {
            params.push(sql_value(&condition.value));
            let column = condition.field.name();
            conditions.push(match condition.comparison {
                Comparison::Equals => format!("{} = ${}", column, params.len()),
                Comparison::Contains => format!("strpos({}, ${}) > 0", column, params.len()),
            });
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        params.push(&filter.limit);
        params.push(&filter.offset);

        let query = format!(
            "SELECT {} FROM books{} ORDER BY id LIMIT ${} OFFSET ${}",
            BOOK_COLUMNS,
            where_clause,
            params.len() - 1,
            params.len()
        );
        tracing::debug!("Listing books with {}", query);

        let rows = self.client.query(query.as_str(), &params).await?;

        rows.iter()
            .map(|row| Ok(book_from_row(row)?))
            .collect()
    }

    async fn update_book(&self, update: &BookUpdate) -> Result<u64, BookRepositoryError> {
        if update.assignments.is_empty() {
            let rows = self
                .client
                .query("SELECT id FROM books WHERE id = ($1)", &[&update.book_id])
                .await?;
            return Ok(rows.len() as u64);
        }

        let mut params: Vec<&(dyn ToSql + Sync)> = vec![];
        let mut set_clauses = vec![];

        for assignment in &update.assignments {
            params.push(match assignment {
                Assignment::Field(_, value) => sql_value(value),
                Assignment::UpdatedAt(updated_at) => updated_at as &(dyn ToSql + Sync),
            });
            set_clauses.push(format!("{} = ${}", assignment.column(), params.len()));
        }
        params.push(&update.book_id);

        let query = format!(
            "UPDATE books SET {} WHERE id = ${}",
            set_clauses.join(", "),
            params.len()
        );

        self.client.execute(query.as_str(), &params).await.map_err(|err| {
            if is_unique_violation(&err) {
                let isbn = update
                    .assignments
                    .iter()
                    .find_map(|assignment| match assignment {
                        Assignment::Field(BookField::Isbn, FieldValue::Text(isbn)) => {
                            Some(isbn.clone())
                        }
                        _ => None,
                    })
                    .unwrap_or_default();
                BookRepositoryError::DuplicateIsbn(isbn)
            } else {
                err.into()
            }
        })
    }

    async fn delete_book(&self, book_id: BookId) -> Result<u64, BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("DELETE FROM books WHERE id = ($1)")
            .await?;

        Ok(self.client.execute(&stmt, &[&book_id]).await?)
    }
}
