//! sqlscope-core: dialect-aware SQL static analysis
//!
//! Answers two questions about a SQL script without executing it: may it run
//! in a read-only session, and which tables does it reference. Analysis is
//! dispatched per [`Engine`] through an [`EngineRegistry`] built once at
//! startup.
//!
//! ```
//! use sqlscope_core::{Engine, EngineRegistry, SchemaResource};
//!
//! let registry = EngineRegistry::with_default_engines();
//! let verdict = registry
//!     .validate_query(Engine::MySql, "SELECT * FROM users")
//!     .unwrap();
//! assert!(verdict.is_pure_read());
//!
//! let resources = registry
//!     .extract_resource_list(Engine::MySql, "app", "", "SELECT * FROM billing.invoices")
//!     .unwrap();
//! assert_eq!(resources, vec![SchemaResource::new("billing", "invoices")]);
//! ```

pub mod analyzer;
pub mod dialects;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod parser;
pub mod registry;
pub mod resource;

pub use analyzer::{QueryVerdict, StatementKind, UtilityKind};
pub use engine::{DialectFamily, Engine};
pub use error::{Error, Result};
pub use parser::ParsedScript;
pub use registry::{EngineEntry, EngineRegistry, RegistryBuilder};
pub use resource::SchemaResource;
