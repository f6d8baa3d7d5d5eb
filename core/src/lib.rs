//! Wire contract shared by Halifax servers and the clients that call them.
//!
//! - [`ApiResponse`]: the JSON envelope around every response body
//! - [`ErrorKind`]: the closed set of classified failures and their HTTP statuses
//! - [`DomainError`]: business errors a handler raises or a client receives

mod envelope;
mod error;

pub use envelope::{ApiError, ApiResponse};
pub use error::{DomainError, ErrorKind};
