//! Shared primitives for the chromrec ancestral-reconstruction workspace.
//!
//! `chromrec-core` provides the foundation the other crates build on:
//!
//! - **Error types**: [`ChromrecError`] and [`Result`] for structured error handling
//! - **Traits**: [`Summarizable`] for one-line summaries of domain types

pub mod error;
pub mod traits;

pub use error::{ChromrecError, EmptyInput, LeafSetMismatch, Result};
pub use traits::*;
