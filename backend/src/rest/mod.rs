//! # REST API Interface Layer
//!
//! Provides the HTTP endpoints of the kitten show under `/api/v1`.
//! This layer handles:
//! - Request extraction and validation
//! - Translation of storage results into JSON payloads
//! - Error translation from storage errors to HTTP status codes
//! - Request logging

pub mod breed_apis;
pub mod error;
pub mod extract;
pub mod kitten_apis;

pub use breed_apis::*;
pub use error::{ApiError, FieldError};
pub use kitten_apis::*;
