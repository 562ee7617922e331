//! MySQL-family analysis (MySQL, MariaDB, OceanBase, StarRocks)

use sqlparser::ast::Statement;

use crate::analyzer::{
    explain_kind, extract_resources, query_is_read_only, validate_script, QueryVerdict,
    ResolveScope, StatementKind, UtilityKind,
};
use crate::engine::{DialectFamily, Engine};
use crate::error::Result;
use crate::parser::{parse_script, ParsedScript};
use crate::registry::RegistryBuilder;
use crate::resource::SchemaResource;

const FAMILY: DialectFamily = DialectFamily::MySql;

/// Register the MySQL-family functions for every engine speaking the dialect
pub fn register(builder: &mut RegistryBuilder) {
    builder
        .register(Engine::MySql, validate_query, extract_resource_list)
        .register(Engine::MariaDb, validate_query, extract_resource_list)
        .register(Engine::OceanBase, validate_query, extract_resource_list)
        .register(Engine::StarRocks, validate_query, extract_resource_list);
}

/// Parse a MySQL script into statements
pub fn parse_mysql(statement: &str) -> Result<ParsedScript> {
    parse_script(FAMILY.parser_dialect().as_ref(), statement)
}

/// Decide whether a script may run in the SQL editor's read-only session
///
/// Accepted: queries, `EXPLAIN`, `DESCRIBE`, `SHOW` and `SET`. Anything else
/// rejects the whole script.
pub fn validate_query(statement: &str) -> Result<QueryVerdict> {
    let script = parse_mysql(statement)?;
    Ok(validate_script(&script, classify_statement))
}

/// List the tables a script references, resolved against `current_database`
///
/// MySQL has no schema level; the schema argument is ignored.
pub fn extract_resource_list(
    current_database: &str,
    _current_schema: &str,
    statement: &str,
) -> Result<Vec<SchemaResource>> {
    let script = parse_mysql(statement)?;
    let scope = ResolveScope {
        current_database: current_database.to_string(),
        current_schema: None,
        case: FAMILY.identifier_case(),
        layout: FAMILY.name_layout(),
    };
    Ok(extract_resources(&script, &scope))
}

fn classify_statement(stmt: &Statement) -> StatementKind {
    match stmt {
        Statement::Query(query) => {
            if query_is_read_only(query) {
                StatementKind::Select
            } else {
                StatementKind::Other
            }
        }
        Statement::Explain {
            analyze, options, ..
        } => explain_kind(*analyze, options.as_deref()),
        Statement::ExplainTable { .. } => StatementKind::Utility(UtilityKind::Describe),
        Statement::ShowTables { .. }
        | Statement::ShowColumns { .. }
        | Statement::ShowCreate { .. }
        | Statement::ShowVariables { .. }
        | Statement::ShowVariable { .. }
        | Statement::ShowStatus { .. }
        | Statement::ShowFunctions { .. }
        | Statement::ShowCollation { .. }
        | Statement::ShowDatabases { .. }
        | Statement::ShowSchemas { .. }
        | Statement::ShowViews { .. } => StatementKind::Utility(UtilityKind::Show),
        Statement::Use { .. }
        | Statement::Analyze { .. }
        | Statement::Kill { .. }
        | Statement::Flush { .. } => StatementKind::Utility(UtilityKind::Unlisted),
        Statement::SetVariable { .. }
        | Statement::SetNames { .. }
        | Statement::SetNamesDefault { .. }
        | Statement::SetTimeZone { .. }
        | Statement::SetRole { .. }
        | Statement::Execute { .. } => StatementKind::SetOrExecute,
        Statement::StartTransaction { .. }
        | Statement::Commit { .. }
        | Statement::Rollback { .. }
        | Statement::Savepoint { .. }
        | Statement::ReleaseSavepoint { .. }
        | Statement::SetTransaction { .. } => StatementKind::TransactionControl,
        _ => StatementKind::Other,
    }
}
