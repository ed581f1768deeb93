//! HTTP surface for glucofetch.
//!
//! This crate exposes the operator-facing endpoints:
//! - `GET /` - capability/status descriptor
//! - `GET /login` - redirect to the vendor authorization page
//! - `GET /callback` - authorization-code exchange
//! - `GET /fetch-egvs` - reading retrieval + CSV export
//! - `GET /refresh` - manual token refresh
//!
//! Errors from the vendor surface as structured `{"error": ...}` payloads
//! with the originating status code where one exists; nothing is
//! process-fatal, the server stays up for the next request.

mod config;
mod error;
mod routes;
mod sink;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use routes::{AppState, build_router};
pub use sink::CsvSink;
