//! Services Layer
//!
//! Pure business logic over the database connection, called by the Axum
//! handlers in `api`. Every operation either fully applies and persists or
//! returns an error with nothing changed.

use std::fmt;

pub mod book_service;
pub mod profile_service;
pub mod reaction_service;
pub mod shelf_service;
pub mod stats_service;

/// Error type for service operations. Deterministic business-rule
/// violations, never retried.
#[derive(Debug)]
pub enum ServiceError {
    Database(String),
    NotFound,
    Conflict(String),
    Validation(String),
    Forbidden,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Database(msg) => write!(f, "Database error: {}", msg),
            ServiceError::NotFound => write!(f, "Resource not found"),
            ServiceError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ServiceError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ServiceError::Forbidden => write!(f, "Forbidden"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        ServiceError::Database(e.to_string())
    }
}
