//! Schema resources - the tables a script references

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A table reference resolved to its owning database (and schema, where the
/// dialect has one)
///
/// Equality, hashing and ordering are defined over the canonical key, so two
/// resources spelled differently in source text but normalizing to the same
/// key are the same logical reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaResource {
    pub database: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
}

impl SchemaResource {
    pub fn new(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            schema: None,
            table: table.into(),
        }
    }

    pub fn with_schema(
        database: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            schema: Some(schema.into()),
            table: table.into(),
        }
    }

    /// Canonical key: `database.table` or `database.schema.table`
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Bytes of the canonical key, produced without allocating
    fn key_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        let schema = self
            .schema
            .iter()
            .flat_map(|schema| schema.bytes().chain(std::iter::once(b'.')));
        self.database
            .bytes()
            .chain(std::iter::once(b'.'))
            .chain(schema)
            .chain(self.table.bytes())
    }
}

impl std::fmt::Display for SchemaResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}.{}", self.database, schema, self.table),
            None => write!(f, "{}.{}", self.database, self.table),
        }
    }
}

impl PartialEq for SchemaResource {
    fn eq(&self, other: &Self) -> bool {
        self.key_bytes().eq(other.key_bytes())
    }
}

impl Eq for SchemaResource {}

impl Hash for SchemaResource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Byte by byte, so equal keys hash equally however they are split
        for byte in self.key_bytes() {
            state.write_u8(byte);
        }
    }
}

impl PartialOrd for SchemaResource {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaResource {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key_bytes().cmp(other.key_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_without_schema() {
        let resource = SchemaResource::new("shop", "users");
        assert_eq!(resource.key(), "shop.users");
    }

    #[test]
    fn test_key_with_schema() {
        let resource = SchemaResource::with_schema("shop", "public", "users");
        assert_eq!(resource.key(), "shop.public.users");
    }

    #[test]
    fn test_ordering_follows_key() {
        let mut resources = vec![
            SchemaResource::new("shop", "users"),
            SchemaResource::new("billing", "invoices"),
            SchemaResource::new("shop", "items"),
        ];
        resources.sort();
        let keys: Vec<String> = resources.iter().map(|r| r.key()).collect();
        assert_eq!(keys, vec!["billing.invoices", "shop.items", "shop.users"]);
    }

    #[test]
    fn test_equality_is_by_key() {
        assert_eq!(
            SchemaResource::new("shop", "users"),
            SchemaResource::new("shop", "users")
        );
        assert_ne!(
            SchemaResource::new("shop", "users"),
            SchemaResource::with_schema("shop", "public", "users")
        );
    }

    #[test]
    fn test_comparisons_agree_with_key_strings() {
        use std::collections::hash_map::DefaultHasher;

        fn hash_of(resource: &SchemaResource) -> u64 {
            let mut hasher = DefaultHasher::new();
            resource.hash(&mut hasher);
            hasher.finish()
        }

        // Ordering is by key text, not by field: "a-b.t" sorts before "a.t"
        let mut resources = vec![
            SchemaResource::new("a", "t"),
            SchemaResource::new("a-b", "t"),
            SchemaResource::with_schema("a", "b", "c"),
        ];
        resources.sort();
        let keys: Vec<String> = resources.iter().map(|r| r.key()).collect();
        let mut expected = keys.clone();
        expected.sort();
        assert_eq!(keys, expected);
        assert_eq!(keys, vec!["a-b.t", "a.b.c", "a.t"]);

        // Same key text from a dotted database name and from a schema
        let dotted = SchemaResource::new("a.b", "c");
        let schema = SchemaResource::with_schema("a", "b", "c");
        assert_eq!(dotted, schema);
        assert_eq!(hash_of(&dotted), hash_of(&schema));
    }
}
