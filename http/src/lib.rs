//! Typed HTTP client base for Halifax APIs
//!
//! Builds JSON requests, sends them through a [`Transport`] and unwraps the
//! `{"data": ..., "error": {"message": ...}}` envelope into a typed result.
//! Failures are classified by status: 400/401/404 become business errors,
//! anything else is reported as unclassified with the client's name.

mod client;
pub mod error;
mod request;
mod transport;

pub use client::HalifaxClient;
pub use error::{BoxError, ClientError, Result, TransportError};
pub use halifax_core::{ApiError, ApiResponse, DomainError, ErrorKind};
pub use request::{ApiRequest, JSON_CONTENT_TYPE, build_request};
pub use transport::{ReqwestTransport, Transport, TransportResponse};
