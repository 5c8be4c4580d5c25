//! # Search Service Shared
//!
//! Plain data types shared across the search service crates: the result
//! envelope returned by search calls, document references, and the
//! `Document` trait every indexed model implements.

mod document;
mod envelope;

pub use document::{Document, DocumentPath};
pub use envelope::{Category, ResultEnvelope};
