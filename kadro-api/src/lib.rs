/// Kadro API server library
///
/// HTTP surface of the Kadro personnel and asset tracking backend. The
/// server exposes the identity workflow (registration, verification,
/// login, password reset), profile reads, media uploads, and the asset
/// assignment workflow over a versioned REST API.
///
/// # Architecture
///
/// - `app`: application state, router assembly, session middleware
/// - `config`: environment-based configuration
/// - `error`: the unified workflow failure taxonomy
/// - `response`: the uniform success envelope
/// - `mailer` / `media`: outbound collaborator ports
/// - `routes`: request handlers, grouped per resource
///
/// Data access lives in the `kadro-shared` crate; handlers compose its
/// model operations into workflows.

pub mod app;
pub mod config;
pub mod error;
pub mod mailer;
pub mod media;
pub mod response;
pub mod routes;

pub use app::{build_router, AppState};
pub use config::Config;
pub use error::{ApiError, ApiResult};
