//! Storage abstraction for chitti.
//!
//! Backend crates (e.g., chitti-store-local) implement this trait so
//! `chitti-core` doesn't depend on any specific database engine or document layout.

use thiserror::Error;

mod store;
mod types;

pub use store::*;
pub use types::*;

/// Uniform error type for all storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("conflict")]
    Conflict,
    #[error("backend error: {0}")]
    Backend(String),
}
