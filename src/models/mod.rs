//! Core data models for identifiers and resolution results.

mod identifier;
mod record;

pub use identifier::{Identifier, IdentifierError};
pub use record::ResolvedRecord;
