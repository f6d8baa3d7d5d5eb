//! Server-side half of Halifax: an axum stack that answers every request with
//! the standard JSON envelope.
//!
//! - [`HalifaxConfig`]: explicit configuration loaded once at startup
//! - [`Halifax`]: wraps application routes with auth, CORS, Swagger and error mapping
//! - [`AppError`] / [`ApiJson`]: handler return types rendered as envelopes
//! - [`Principal`]: extractor for routes that require a verified bearer token

mod app;
pub mod config;
pub mod docs;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod services;

pub use app::{Halifax, init_panic_hook, init_tracing, serve};
pub use config::{AppEnv, AuthConfig, AuthKey, ConfigError, HalifaxConfig};
pub use error::AppError;
pub use extractors::Principal;
pub use halifax_core::{ApiError, ApiResponse, DomainError, ErrorKind};
pub use response::ApiJson;
