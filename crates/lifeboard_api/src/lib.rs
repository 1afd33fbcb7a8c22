//! Request handlers for Lifeboard.
//!
//! # Responsibility
//! - Expose use-case level endpoints over `lifeboard_core`.
//! - Return `ApiResponse` envelopes with stable status codes.
//!
//! # Invariants
//! - Endpoints never panic.
//! - Every user-scoped endpoint authenticates through the session store.

mod api;
mod files;
mod goals;
pub mod multipart;
pub mod response;
mod settings;
mod tasks;

pub use api::{Api, RequestContext, SessionInfo};
pub use files::UPLOAD_FIELD;
pub use multipart::{FormPart, MultipartForm};
pub use response::{ApiFailure, ApiResponse};
pub use tasks::TaskChange;

/// Minimal health-check API.
pub fn ping() -> String {
    lifeboard_core::ping().to_owned()
}

pub fn core_version() -> String {
    lifeboard_core::core_version().to_owned()
}
