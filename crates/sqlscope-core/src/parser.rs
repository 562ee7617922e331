//! Dialect parser adapter - splits a script into statement trees

use sqlparser::ast::Statement;
use sqlparser::dialect::Dialect;
use sqlparser::parser::Parser;

use crate::error::Result;

/// The statements of one input text, in textual order
///
/// Empty segments (`;;`) and whitespace-only input produce no entries.
#[derive(Debug, Clone, Default)]
pub struct ParsedScript {
    statements: Vec<Statement>,
}

impl ParsedScript {
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }
}

impl<'a> IntoIterator for &'a ParsedScript {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

/// Parse `text` with the given dialect
///
/// Statement splitting honors the dialect's quoting and comment rules since it
/// is done by the grammar itself. A failure in any statement fails the whole
/// call; no partial script is returned.
pub fn parse_script(dialect: &dyn Dialect, text: &str) -> Result<ParsedScript> {
    let statements = Parser::parse_sql(dialect, text)?;
    tracing::trace!(statements = statements.len(), "parsed script");
    Ok(ParsedScript { statements })
}
