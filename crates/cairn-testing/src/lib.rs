//! # cairn-testing
//!
//! Helpers for exercising cairn mutations without a database: an in-memory
//! [`ItemWriter`](cairn_mutation::ItemWriter) and assertions over
//! [`MutationResponse`](cairn_mutation::MutationResponse)s.

pub mod assertions;
pub mod memory;

pub use assertions::MutationAssertions;
pub use memory::MemoryStore;

use thiserror::Error;

/// Testing framework errors
#[derive(Error, Debug)]
pub enum TestError {
    #[error("Assertion failed: {message}")]
    Assertion { message: String },
}

pub type TestResult<T> = Result<T, TestError>;
