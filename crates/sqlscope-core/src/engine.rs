//! Database engines and the SQL dialect families they speak

use serde::{Deserialize, Serialize};
use sqlparser::dialect::{Dialect, MySqlDialect, PostgreSqlDialect};
use std::str::FromStr;

use crate::normalize::IdentifierCase;

/// Database engine identifier
///
/// Used as the registry key. Not every engine has an analysis implementation;
/// looking up one that does not yields [`crate::Error::UnsupportedEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    MySql,
    MariaDb,
    OceanBase,
    StarRocks,
    Postgres,
    Snowflake,
    MsSql,
    Sqlite,
}

impl Engine {
    /// All known engines, in declaration order
    pub const ALL: [Engine; 8] = [
        Engine::MySql,
        Engine::MariaDb,
        Engine::OceanBase,
        Engine::StarRocks,
        Engine::Postgres,
        Engine::Snowflake,
        Engine::MsSql,
        Engine::Sqlite,
    ];

    /// The dialect family whose grammar this engine is analyzed with, if any
    pub fn family(&self) -> Option<DialectFamily> {
        match self {
            Engine::MySql | Engine::MariaDb | Engine::OceanBase | Engine::StarRocks => {
                Some(DialectFamily::MySql)
            }
            Engine::Postgres => Some(DialectFamily::Postgres),
            Engine::Snowflake | Engine::MsSql | Engine::Sqlite => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::MySql => "mysql",
            Engine::MariaDb => "mariadb",
            Engine::OceanBase => "oceanbase",
            Engine::StarRocks => "starrocks",
            Engine::Postgres => "postgres",
            Engine::Snowflake => "snowflake",
            Engine::MsSql => "mssql",
            Engine::Sqlite => "sqlite",
        }
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mysql8" => Ok(Engine::MySql),
            "mariadb" => Ok(Engine::MariaDb),
            "oceanbase" => Ok(Engine::OceanBase),
            "starrocks" => Ok(Engine::StarRocks),
            "postgresql" | "postgres" | "pg" => Ok(Engine::Postgres),
            "snowflake" => Ok(Engine::Snowflake),
            "mssql" | "sqlserver" => Ok(Engine::MsSql),
            "sqlite" => Ok(Engine::Sqlite),
            _ => Err(format!(
                "Unknown engine: '{}'. Known engines: {}.",
                s,
                Engine::ALL
                    .iter()
                    .map(|e| e.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A grammar and identifier rule set shared by one or more engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectFamily {
    MySql,
    Postgres,
}

/// How many qualifiers a table reference may carry and what they mean
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameLayout {
    /// `table` or `database.table`
    DatabaseTable,
    /// `table`, `schema.table` or `database.schema.table`
    DatabaseSchemaTable,
}

impl DialectFamily {
    /// Get the sqlparser dialect for parsing
    pub fn parser_dialect(&self) -> Box<dyn Dialect> {
        match self {
            DialectFamily::MySql => Box::new(MySqlDialect {}),
            DialectFamily::Postgres => Box::new(PostgreSqlDialect {}),
        }
    }

    /// Case rule applied to unquoted identifiers
    pub fn identifier_case(&self) -> IdentifierCase {
        match self {
            DialectFamily::MySql => IdentifierCase::Preserve,
            DialectFamily::Postgres => IdentifierCase::FoldLower,
        }
    }

    pub fn name_layout(&self) -> NameLayout {
        match self {
            DialectFamily::MySql => NameLayout::DatabaseTable,
            DialectFamily::Postgres => NameLayout::DatabaseSchemaTable,
        }
    }

    /// Schema assumed for unqualified tables when the caller supplies none
    pub fn default_schema(&self) -> Option<&'static str> {
        match self {
            DialectFamily::MySql => None,
            DialectFamily::Postgres => Some("public"),
        }
    }
}

impl std::fmt::Display for DialectFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DialectFamily::MySql => write!(f, "mysql"),
            DialectFamily::Postgres => write!(f, "postgresql"),
        }
    }
}
