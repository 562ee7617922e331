//! PostgreSQL analysis

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

const FAMILY: DialectFamily = DialectFamily::Postgres;

pub fn register(builder: &mut RegistryBuilder) {
    builder.register(Engine::Postgres, validate_query, extract_resource_list);
}

/// Parse a PostgreSQL script into statements
pub fn parse_postgres(statement: &str) -> Result<ParsedScript> {
    parse_script(FAMILY.parser_dialect().as_ref(), statement)
}

/// Decide whether a script may run in the SQL editor's read-only session
///
/// Data-modifying CTEs (`WITH u AS (UPDATE ... RETURNING *) SELECT ...`) are
/// rejected along with plain DML.
pub fn validate_query(statement: &str) -> Result<QueryVerdict> {
    let script = parse_postgres(statement)?;
    Ok(validate_script(&script, classify_statement))
}

/// List the tables a script references
///
/// Unqualified tables resolve to `current_schema` (`public` when empty) in
/// `current_database`; `schema.table` keeps the current database. Both
/// arguments are taken as already-normalized names.
pub fn extract_resource_list(
    current_database: &str,
    current_schema: &str,
    statement: &str,
) -> Result<Vec<SchemaResource>> {
    let script = parse_postgres(statement)?;
    let current_schema = if current_schema.is_empty() {
        FAMILY.default_schema().map(str::to_string)
    } else {
        Some(current_schema.to_string())
    };
    let scope = ResolveScope {
        current_database: current_database.to_string(),
        current_schema,
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
        Statement::ShowVariable { .. }
        | Statement::ShowVariables { .. }
        | Statement::ShowTables { .. }
        | Statement::ShowColumns { .. }
        | Statement::ShowFunctions { .. }
        | Statement::ShowDatabases { .. }
        | Statement::ShowSchemas { .. }
        | Statement::ShowViews { .. } => StatementKind::Utility(UtilityKind::Show),
        Statement::Analyze { .. } | Statement::Kill { .. } => {
            StatementKind::Utility(UtilityKind::Unlisted)
        }
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
