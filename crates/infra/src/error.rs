//! Errors surfaced by the order service to whatever request layer calls it.

use thiserror::Error;

use bookstore_core::{BookId, DomainError};

use crate::store::StoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderServiceError {
    /// A referenced book or order does not exist. Aborts the batch.
    #[error("{0} not found")]
    NotFound(String),

    /// A line asked for more units than are in stock. Client-input rejection.
    #[error("not enough stock for book {book_id} (requested: {requested}, available: {available})")]
    InsufficientStock {
        book_id: BookId,
        requested: u32,
        available: u32,
    },

    /// Malformed input (e.g. non-positive quantity, line of another order).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The record being created already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A read or write against the store failed. Aborts the batch; never ignored.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl OrderServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Attach the offending book to a domain error raised while handling one line.
    pub fn for_book(book_id: BookId, err: DomainError) -> Self {
        match err {
            DomainError::InsufficientStock {
                requested,
                available,
            } => Self::InsufficientStock {
                book_id,
                requested,
                available,
            },
            DomainError::NotFound(_) => Self::NotFound(format!("book {book_id}")),
            other => other.into(),
        }
    }

    /// Whether the caller sent something that can never succeed as-is.
    pub fn is_client_error(&self) -> bool {
        self.http_status() < 500
    }

    /// HTTP status class a request layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InsufficientStock { .. } | Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::Persistence(StoreError::Unavailable(_)) => 503,
            Self::Persistence(_) => 500,
        }
    }
}

impl From<DomainError> for OrderServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => Self::Validation(msg),
            DomainError::InvalidId(msg) => Self::Validation(msg),
            DomainError::NotFound(what) => Self::NotFound(what),
            DomainError::Conflict(msg) => Self::Conflict(msg),
            // Without a line there is no book to name; callers use `for_book`.
            DomainError::InsufficientStock {
                requested,
                available,
            } => Self::Validation(format!(
                "not enough stock (requested: {requested}, available: {available})"
            )),
        }
    }
}
