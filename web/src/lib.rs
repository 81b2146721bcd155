//! Axum integration for the ChainGo marketplace.
//!
//! This crate is the imperative shell around the marketplace services:
//! it turns domain errors into HTTP responses and pulls request-scoped data
//! (correlation ids, bearer tokens) out of incoming requests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            HTTP shell (Axum)            │  ← JSON, multipart, headers
//! │  - Request parsing / extractors         │  ← CORS, body limits
//! │  - Error → status code mapping          │  ← Logging, metrics
//! ├─────────────────────────────────────────┤
//! │            Marketplace core             │
//! │  - Listing lifecycle, purchases         │  ← Testable in memory
//! │  - Store traits                         │  ← Postgres or in-memory
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use chaingo_web::{AppError, WebResult};
//! use axum::{Json, extract::State};
//!
//! async fn get_listing(State(state): State<AppState>, Path(id): Path<i64>) -> WebResult<Json<Listing>> {
//!     let listing = state.queries.get(ListingId::new(id)).await?;
//!     Ok(Json(listing))
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{BearerToken, CorrelationId};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
