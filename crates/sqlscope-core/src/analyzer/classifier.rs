//! Query classifier - decides whether a script may run in a read-only session

use serde::{Deserialize, Serialize};
use sqlparser::ast::{Expr, Query, SetExpr, Statement, UtilityOption, Value};

use crate::parser::ParsedScript;

/// Script-level outcome of classification
///
/// `read_only` is false when the script runs a statement as a side effect of
/// `EXPLAIN ANALYZE`. `executable` is false when the script contains a
/// session `SET` or `EXECUTE`, which must not be assumed side-effect free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryVerdict {
    pub read_only: bool,
    pub executable: bool,
}

impl QueryVerdict {
    /// Verdict for scripts containing a disallowed or unrecognized statement
    pub const REJECTED: QueryVerdict = QueryVerdict {
        read_only: false,
        executable: false,
    };

    pub fn new(read_only: bool, executable: bool) -> Self {
        Self {
            read_only,
            executable,
        }
    }

    /// Plain reads only: nothing executes and no session state changes
    pub fn is_pure_read(&self) -> bool {
        self.read_only && self.executable
    }
}

/// Top-level shape of a single statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// A query that only reads
    Select,
    Utility(UtilityKind),
    /// Session/variable `SET` or prepared statement execution
    SetOrExecute,
    /// `BEGIN`, `START TRANSACTION`, `COMMIT`, ...
    TransactionControl,
    /// DML, DDL and anything not recognized
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtilityKind {
    Explain { analyze: bool },
    Describe,
    Show,
    /// Utility statements outside the permitted list (`USE`, `KILL`, ...)
    Unlisted,
}

/// Flags accumulated while walking one script
///
/// Constructed fresh for every call.
#[derive(Debug, Default)]
struct QueryValidateState {
    invalid: bool,
    explain_analyze: bool,
    has_execute: bool,
}

impl QueryValidateState {
    fn enter_statement(&mut self, kind: StatementKind) {
        if self.invalid {
            return;
        }
        match kind {
            StatementKind::Select => {}
            StatementKind::Utility(UtilityKind::Explain { analyze }) => {
                if analyze {
                    self.explain_analyze = true;
                }
            }
            StatementKind::Utility(UtilityKind::Describe | UtilityKind::Show) => {}
            StatementKind::SetOrExecute => {
                self.has_execute = true;
            }
            StatementKind::Utility(UtilityKind::Unlisted)
            | StatementKind::TransactionControl
            | StatementKind::Other => {
                tracing::debug!(?kind, "statement not allowed in read-only context");
                self.invalid = true;
            }
        }
    }

    fn finish(self) -> QueryVerdict {
        if self.invalid {
            return QueryVerdict::REJECTED;
        }
        QueryVerdict::new(!self.explain_analyze, !self.has_execute)
    }
}

/// Classify every statement of `script` and aggregate the verdict
///
/// `classify` holds the dialect-specific mapping from statement to kind.
pub fn validate_script<F>(script: &ParsedScript, classify: F) -> QueryVerdict
where
    F: Fn(&Statement) -> StatementKind,
{
    let mut state = QueryValidateState::default();
    for stmt in script {
        state.enter_statement(classify(stmt));
        if state.invalid {
            break;
        }
    }
    state.finish()
}

/// Kind of an `EXPLAIN`, honoring both `EXPLAIN ANALYZE` and the
/// parenthesized `EXPLAIN (ANALYZE [true|false], ...)` form
pub fn explain_kind(analyze: bool, options: Option<&[UtilityOption]>) -> StatementKind {
    let analyze = analyze
        || options
            .unwrap_or_default()
            .iter()
            .any(|opt| opt.name.value.eq_ignore_ascii_case("analyze") && !option_is_off(opt));
    StatementKind::Utility(UtilityKind::Explain { analyze })
}

/// A bare option is on; only an explicit false literal turns it off
fn option_is_off(option: &UtilityOption) -> bool {
    let is_off_word = |s: &str| {
        s.eq_ignore_ascii_case("false") || s.eq_ignore_ascii_case("off") || s == "0"
    };
    match &option.arg {
        None => false,
        Some(Expr::Value(Value::Boolean(b))) => !b,
        Some(Expr::Value(Value::Number(n, _))) => n == "0",
        Some(Expr::Value(Value::SingleQuotedString(s))) => is_off_word(s.as_str()),
        Some(Expr::Identifier(ident)) => is_off_word(&ident.value),
        Some(_) => false,
    }
}

/// Check that a query only reads
///
/// Rejects `SELECT ... INTO` and any body, set operation branch or CTE that
/// is not a plain read.
pub fn query_is_read_only(query: &Query) -> bool {
    if let Some(with) = &query.with {
        if !with.cte_tables.iter().all(|cte| query_is_read_only(&cte.query)) {
            return false;
        }
    }
    set_expr_is_read_only(&query.body)
}

fn set_expr_is_read_only(set_expr: &SetExpr) -> bool {
    match set_expr {
        SetExpr::Select(select) => select.into.is_none(),
        SetExpr::Query(query) => query_is_read_only(query),
        SetExpr::SetOperation { left, right, .. } => {
            set_expr_is_read_only(left) && set_expr_is_read_only(right)
        }
        SetExpr::Values(_) | SetExpr::Table(_) => true,
        // INSERT/UPDATE and anything newer grammars add
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_script;
    use sqlparser::dialect::PostgreSqlDialect;

    fn classify_as(kinds: &[StatementKind]) -> QueryVerdict {
        let mut state = QueryValidateState::default();
        for kind in kinds {
            state.enter_statement(*kind);
        }
        state.finish()
    }

    #[test]
    fn test_empty_script_is_pure_read() {
        assert_eq!(classify_as(&[]), QueryVerdict::new(true, true));
    }

    #[test]
    fn test_four_outcomes() {
        let explain_analyze = StatementKind::Utility(UtilityKind::Explain { analyze: true });
        assert_eq!(
            classify_as(&[StatementKind::Select]),
            QueryVerdict::new(true, true)
        );
        assert_eq!(
            classify_as(&[explain_analyze]),
            QueryVerdict::new(false, true)
        );
        assert_eq!(
            classify_as(&[StatementKind::SetOrExecute, StatementKind::Select]),
            QueryVerdict::new(true, false)
        );
        assert_eq!(
            classify_as(&[StatementKind::SetOrExecute, explain_analyze]),
            QueryVerdict::new(false, false)
        );
    }

    #[test]
    fn test_invalid_statement_collapses_verdict() {
        assert_eq!(
            classify_as(&[
                StatementKind::Select,
                StatementKind::Other,
                StatementKind::Select
            ]),
            QueryVerdict::REJECTED
        );
        assert_eq!(
            classify_as(&[StatementKind::TransactionControl]),
            QueryVerdict::REJECTED
        );
        assert_eq!(
            classify_as(&[StatementKind::Utility(UtilityKind::Unlisted)]),
            QueryVerdict::REJECTED
        );
    }

    #[test]
    fn test_describe_and_show_are_accepted() {
        assert_eq!(
            classify_as(&[
                StatementKind::Utility(UtilityKind::Describe),
                StatementKind::Utility(UtilityKind::Show),
            ]),
            QueryVerdict::new(true, true)
        );
    }

    #[test]
    fn test_validate_script_uses_classifier() {
        let script = parse_script(&PostgreSqlDialect {}, "SELECT 1; SELECT 2").unwrap();
        let verdict = validate_script(&script, |_| StatementKind::SetOrExecute);
        assert_eq!(verdict, QueryVerdict::new(true, false));
    }

    fn parse_query(sql: &str) -> Box<Query> {
        let script = parse_script(&PostgreSqlDialect {}, sql).unwrap();
        match script.into_statements().into_iter().next() {
            Some(Statement::Query(query)) => query,
            other => panic!("expected a query, got {:?}", other),
        }
    }

    #[test]
    fn test_query_is_read_only() {
        assert!(query_is_read_only(&parse_query(
            "WITH a AS (SELECT id FROM users) SELECT * FROM a UNION SELECT id FROM orders"
        )));
        assert!(query_is_read_only(&parse_query("VALUES (1), (2)")));
    }

    #[test]
    fn test_select_into_is_not_read_only() {
        assert!(!query_is_read_only(&parse_query(
            "SELECT * INTO backup_users FROM users"
        )));
    }

    fn option(name: &str, arg: Option<Expr>) -> UtilityOption {
        UtilityOption {
            name: sqlparser::ast::Ident::new(name),
            arg,
        }
    }

    #[test]
    fn test_explain_options_analyze() {
        let analyzing = StatementKind::Utility(UtilityKind::Explain { analyze: true });
        let planning = StatementKind::Utility(UtilityKind::Explain { analyze: false });

        assert_eq!(explain_kind(true, None), analyzing);
        assert_eq!(explain_kind(false, None), planning);

        let bare = [option("ANALYZE", None)];
        assert_eq!(explain_kind(false, Some(&bare[..])), analyzing);

        let explicit_on = [
            option("buffers", None),
            option("analyze", Some(Expr::Value(Value::Boolean(true)))),
        ];
        assert_eq!(explain_kind(false, Some(&explicit_on[..])), analyzing);

        let off_word = [option(
            "analyze",
            Some(Expr::Identifier(sqlparser::ast::Ident::new("OFF"))),
        )];
        assert_eq!(explain_kind(false, Some(&off_word[..])), planning);

        let unrelated = [option("verbose", None)];
        assert_eq!(explain_kind(false, Some(&unrelated[..])), planning);
    }
}
