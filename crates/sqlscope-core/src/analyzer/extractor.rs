//! Resource extractor - collects the tables a script references

use sqlparser::ast::{ObjectName, Query, TableFactor, Visit, Visitor};
use std::collections::HashMap;
use std::ops::ControlFlow;

use crate::engine::NameLayout;
use crate::normalize::{normalize_identifier, normalize_object_name, IdentifierCase};
use crate::parser::ParsedScript;
use crate::resource::SchemaResource;

/// Caller context and dialect rules used to resolve table references
#[derive(Debug, Clone)]
pub struct ResolveScope {
    pub current_database: String,
    /// Schema for unqualified tables; ignored by `NameLayout::DatabaseTable`
    pub current_schema: Option<String>,
    pub case: IdentifierCase,
    pub layout: NameLayout,
}

impl ResolveScope {
    /// Resolve normalized name components into a resource
    ///
    /// Returns `None` for an empty name. Qualifiers beyond what the layout
    /// understands (e.g. a StarRocks catalog) are dropped from the front.
    pub fn resolve(&self, parts: &[String]) -> Option<SchemaResource> {
        match self.layout {
            NameLayout::DatabaseTable => match parts {
                [] => None,
                [table] => Some(SchemaResource::new(&self.current_database, table)),
                [.., database, table] => Some(SchemaResource::new(database, table)),
            },
            NameLayout::DatabaseSchemaTable => {
                let current_schema = self.current_schema.clone().unwrap_or_default();
                match parts {
                    [] => None,
                    [table] => Some(SchemaResource::with_schema(
                        &self.current_database,
                        current_schema,
                        table,
                    )),
                    [schema, table] => Some(SchemaResource::with_schema(
                        &self.current_database,
                        schema,
                        table,
                    )),
                    [.., database, schema, table] => {
                        Some(SchemaResource::with_schema(database, schema, table))
                    }
                }
            }
        }
    }
}

/// CTEs declared by one `WITH` clause
///
/// Without `RECURSIVE` a CTE name is visible only to the CTEs after it and to
/// the main body; inside its own body the same name means the real table.
struct CteScope {
    names: Vec<String>,
    /// Address of each CTE body, to recognize it when the visitor enters it
    bodies: Vec<*const Query>,
    recursive: bool,
    /// Number of leading names currently visible
    visible: usize,
}

impl CteScope {
    fn new(query: &Query, case: IdentifierCase) -> Self {
        let (names, bodies, recursive) = match &query.with {
            Some(with) => (
                with.cte_tables
                    .iter()
                    .map(|cte| normalize_identifier(&cte.alias.name, case))
                    .collect(),
                with.cte_tables
                    .iter()
                    .map(|cte| &*cte.query as *const Query)
                    .collect(),
                with.recursive,
            ),
            None => (Vec::new(), Vec::new(), false),
        };
        Self {
            names,
            bodies,
            recursive,
            visible: 0,
        }
    }

    fn body_index(&self, query: &Query) -> Option<usize> {
        self.bodies
            .iter()
            .position(|body| std::ptr::eq(*body, query))
    }

    fn contains(&self, name: &str) -> bool {
        let visible = if self.recursive {
            &self.names[..]
        } else {
            &self.names[..self.visible]
        };
        visible.iter().any(|n| n == name)
    }
}

/// Walks statement trees and records every table reference
///
/// Single use: one collector per analysis call.
struct ResourceCollector<'a> {
    scope: &'a ResolveScope,
    /// Canonical key -> resource
    resources: HashMap<String, SchemaResource>,
    /// CTEs declared by each enclosing query, innermost last
    cte_scopes: Vec<CteScope>,
    /// Set when the next relation is the name of a table-valued function
    skip_next_relation: bool,
}

impl<'a> ResourceCollector<'a> {
    fn new(scope: &'a ResolveScope) -> Self {
        Self {
            scope,
            resources: HashMap::new(),
            cte_scopes: Vec::new(),
            skip_next_relation: false,
        }
    }

    fn is_cte(&self, name: &str) -> bool {
        self.cte_scopes.iter().any(|scope| scope.contains(name))
    }

    fn record(&mut self, relation: &ObjectName) {
        let parts = normalize_object_name(relation, self.scope.case);
        if let [name] = parts.as_slice() {
            if self.is_cte(name) {
                return;
            }
        }
        if let Some(resource) = self.scope.resolve(&parts) {
            self.resources.insert(resource.key(), resource);
        }
    }

    /// Emit the collected resources sorted by canonical key
    fn into_resources(self) -> Vec<SchemaResource> {
        let mut result: Vec<SchemaResource> = self.resources.into_values().collect();
        result.sort();
        result
    }
}

impl Visitor for ResourceCollector<'_> {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        // Entering CTE body `i`: only the CTEs before it are visible
        if let Some(scope) = self.cte_scopes.last_mut() {
            if let Some(i) = scope.body_index(query) {
                scope.visible = i;
            }
        }
        self.cte_scopes.push(CteScope::new(query, self.scope.case));
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        self.cte_scopes.pop();
        if let Some(scope) = self.cte_scopes.last_mut() {
            if let Some(i) = scope.body_index(query) {
                scope.visible = i + 1;
            }
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_table_factor(&mut self, factor: &TableFactor) -> ControlFlow<Self::Break> {
        // `FROM generate_series(1, 3)` parses as a table with arguments; its
        // name is visited as a relation right after this call.
        if let TableFactor::Table { args: Some(_), .. } = factor {
            self.skip_next_relation = true;
        }
        ControlFlow::Continue(())
    }

    fn post_visit_table_factor(&mut self, _factor: &TableFactor) -> ControlFlow<Self::Break> {
        self.skip_next_relation = false;
        ControlFlow::Continue(())
    }

    fn pre_visit_relation(&mut self, relation: &ObjectName) -> ControlFlow<Self::Break> {
        if std::mem::take(&mut self.skip_next_relation) {
            return ControlFlow::Continue(());
        }
        self.record(relation);
        ControlFlow::Continue(())
    }
}

/// Collect, deduplicate and order every table reference in `script`
pub fn extract_resources(script: &ParsedScript, scope: &ResolveScope) -> Vec<SchemaResource> {
    let mut collector = ResourceCollector::new(scope);
    for stmt in script {
        // The collector never breaks
        let _ = stmt.visit(&mut collector);
    }
    let resources = collector.into_resources();
    tracing::trace!(resources = resources.len(), "extracted resources");
    resources
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mysql_scope(database: &str) -> ResolveScope {
        ResolveScope {
            current_database: database.to_string(),
            current_schema: None,
            case: IdentifierCase::Preserve,
            layout: NameLayout::DatabaseTable,
        }
    }

    fn parts(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_database_table() {
        let scope = mysql_scope("shop");
        assert_eq!(
            scope.resolve(&parts(&["users"])),
            Some(SchemaResource::new("shop", "users"))
        );
        assert_eq!(
            scope.resolve(&parts(&["billing", "invoices"])),
            Some(SchemaResource::new("billing", "invoices"))
        );
        assert_eq!(
            scope.resolve(&parts(&["hive_catalog", "billing", "invoices"])),
            Some(SchemaResource::new("billing", "invoices"))
        );
        assert_eq!(scope.resolve(&[]), None);
    }

    #[test]
    fn test_resolve_database_schema_table() {
        let scope = ResolveScope {
            current_database: "shop".to_string(),
            current_schema: Some("public".to_string()),
            case: IdentifierCase::FoldLower,
            layout: NameLayout::DatabaseSchemaTable,
        };
        assert_eq!(
            scope.resolve(&parts(&["users"])),
            Some(SchemaResource::with_schema("shop", "public", "users"))
        );
        assert_eq!(
            scope.resolve(&parts(&["sales", "orders"])),
            Some(SchemaResource::with_schema("shop", "sales", "orders"))
        );
        assert_eq!(
            scope.resolve(&parts(&["crm", "sales", "orders"])),
            Some(SchemaResource::with_schema("crm", "sales", "orders"))
        );
    }
}
