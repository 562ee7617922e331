//! Per-dialect classifier and extractor implementations
//!
//! Each module exposes `validate_query`, `extract_resource_list` and a
//! `register` hook wiring them into a [`crate::registry::RegistryBuilder`]
//! for every engine that speaks the dialect.

pub mod mysql;
pub mod postgres;
