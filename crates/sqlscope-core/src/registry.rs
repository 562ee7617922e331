//! Engine registry - maps engines to their analysis functions
//!
//! Built once with [`RegistryBuilder`] during startup, then frozen into an
//! [`EngineRegistry`] that has no mutating methods. Share it by reference or
//! through an `Arc`; it is `Send + Sync`.

use indexmap::IndexMap;

use crate::analyzer::QueryVerdict;
use crate::dialects;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::resource::SchemaResource;

/// Classifies a script: `statement -> verdict`
pub type ValidateQueryFn = fn(&str) -> Result<QueryVerdict>;

/// Lists referenced tables: `(current_database, current_schema, statement)`
pub type ExtractResourceListFn = fn(&str, &str, &str) -> Result<Vec<SchemaResource>>;

/// The analysis functions registered for one engine
#[derive(Clone, Copy)]
pub struct EngineEntry {
    validate_query: ValidateQueryFn,
    extract_resource_list: ExtractResourceListFn,
}

impl EngineEntry {
    pub fn validate_query(&self, statement: &str) -> Result<QueryVerdict> {
        (self.validate_query)(statement)
    }

    pub fn extract_resource_list(
        &self,
        current_database: &str,
        current_schema: &str,
        statement: &str,
    ) -> Result<Vec<SchemaResource>> {
        (self.extract_resource_list)(current_database, current_schema, statement)
    }
}

impl std::fmt::Debug for EngineEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineEntry").finish_non_exhaustive()
    }
}

/// Collects registrations before the registry is frozen
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: IndexMap<Engine, EngineEntry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the analysis functions for `engine`
    ///
    /// Several engines may share the same functions.
    ///
    /// # Panics
    ///
    /// Panics if `engine` is already registered; registration happens once
    /// at startup and a duplicate is a wiring bug.
    pub fn register(
        &mut self,
        engine: Engine,
        validate_query: ValidateQueryFn,
        extract_resource_list: ExtractResourceListFn,
    ) -> &mut Self {
        let entry = EngineEntry {
            validate_query,
            extract_resource_list,
        };
        if self.entries.insert(engine, entry).is_some() {
            panic!("engine '{}' is already registered", engine);
        }
        self
    }

    /// Freeze the registrations
    pub fn build(self) -> EngineRegistry {
        tracing::debug!(engines = self.entries.len(), "engine registry built");
        EngineRegistry {
            entries: self.entries,
        }
    }
}

/// Read-only table of registered engines
#[derive(Debug)]
pub struct EngineRegistry {
    entries: IndexMap<Engine, EngineEntry>,
}

impl EngineRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry with every engine this crate implements
    pub fn with_default_engines() -> Self {
        let mut builder = RegistryBuilder::new();
        dialects::mysql::register(&mut builder);
        dialects::postgres::register(&mut builder);
        builder.build()
    }

    pub fn lookup(&self, engine: Engine) -> Result<&EngineEntry> {
        self.entries
            .get(&engine)
            .ok_or(Error::UnsupportedEngine(engine))
    }

    pub fn is_supported(&self, engine: Engine) -> bool {
        self.entries.contains_key(&engine)
    }

    /// Registered engines, in registration order
    pub fn engines(&self) -> impl Iterator<Item = Engine> + '_ {
        self.entries.keys().copied()
    }

    pub fn validate_query(&self, engine: Engine, statement: &str) -> Result<QueryVerdict> {
        self.lookup(engine)?.validate_query(statement)
    }

    pub fn extract_resource_list(
        &self,
        engine: Engine,
        current_database: &str,
        current_schema: &str,
        statement: &str,
    ) -> Result<Vec<SchemaResource>> {
        self.lookup(engine)?
            .extract_resource_list(current_database, current_schema, statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always_read_only(_: &str) -> Result<QueryVerdict> {
        Ok(QueryVerdict::new(true, true))
    }

    fn no_resources(_: &str, _: &str, _: &str) -> Result<Vec<SchemaResource>> {
        Ok(Vec::new())
    }

    #[test]
    fn test_lookup_registered_engine() {
        let mut builder = EngineRegistry::builder();
        builder.register(Engine::Sqlite, always_read_only, no_resources);
        let registry = builder.build();

        let entry = registry.lookup(Engine::Sqlite).unwrap();
        assert_eq!(
            entry.validate_query("anything").unwrap(),
            QueryVerdict::new(true, true)
        );
        assert!(entry.extract_resource_list("db", "", "x").unwrap().is_empty());
    }

    #[test]
    fn test_lookup_unregistered_engine() {
        let registry = EngineRegistry::builder().build();
        let err = registry.lookup(Engine::MySql).unwrap_err();
        assert_eq!(err, Error::UnsupportedEngine(Engine::MySql));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_registration_panics() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(Engine::MySql, always_read_only, no_resources)
            .register(Engine::MySql, always_read_only, no_resources);
    }

    #[test]
    fn test_default_engines_in_registration_order() {
        let registry = EngineRegistry::with_default_engines();
        let engines: Vec<Engine> = registry.engines().collect();
        assert_eq!(
            engines,
            vec![
                Engine::MySql,
                Engine::MariaDb,
                Engine::OceanBase,
                Engine::StarRocks,
                Engine::Postgres
            ]
        );
        assert!(!registry.is_supported(Engine::Snowflake));
    }

    #[test]
    fn test_registry_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineRegistry>();
    }
}
