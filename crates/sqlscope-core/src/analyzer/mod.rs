//! Dialect-independent analysis passes
//!
//! The classifier and the extractor walk parsed statements; the
//! dialect-specific parts (statement classification rules, identifier case,
//! name layout) are supplied by the modules under [`crate::dialects`].

pub mod classifier;
pub mod extractor;

pub use classifier::{
    explain_kind, query_is_read_only, validate_script, QueryVerdict, StatementKind, UtilityKind,
};
pub use extractor::{extract_resources, ResolveScope};
