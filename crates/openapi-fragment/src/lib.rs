//! # openapi-fragment
//!
//! Resolves a single OpenAPI path/operation fragment into an operation
//! descriptor and derives the form fields and validators a "try it out"
//! panel needs.

mod types;
mod resolver;
mod fields;
mod error;

pub use types::*;
pub use resolver::OperationResolver;
pub use fields::{FieldSet, SchemaFieldExtractor};
pub use error::{ResolveError, ResolveResult};
