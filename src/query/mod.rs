//! Query generation for person searches
//!
//! Turns a name, plus optional location and context, into the ordered
//! set of query strings that collectors consume.

mod generator;
pub mod handles;
mod types;

pub use generator::{generate, try_generate, QueryGenerationError, MAX_QUERIES};
pub use handles::candidate_handles;
pub use types::{NameTokens, Query, QueryIntent};
