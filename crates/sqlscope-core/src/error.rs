//! Error types

use sqlparser::parser::ParserError;

use crate::engine::Engine;

/// Errors surfaced by analysis calls and registry lookups
///
/// Unsafe or unrecognized statements are not errors: they are reported through
/// [`crate::QueryVerdict`]. Only input that does not parse and engines without
/// an analysis implementation end up here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum Error {
    /// The statement text does not parse under the dialect's grammar
    #[error("Syntax error: {message}")]
    #[diagnostic(
        code(sqlscope::syntax),
        help("Check the statement against the engine's SQL dialect")
    )]
    Syntax { message: String },

    /// No analysis functions are registered for the engine
    #[error("Engine '{0}' is not supported")]
    #[diagnostic(
        code(sqlscope::unsupported_engine),
        help("Supported engines are listed by `sqlscope engines`")
    )]
    UnsupportedEngine(Engine),
}

impl Error {
    pub fn syntax(message: impl Into<String>) -> Self {
        Error::Syntax {
            message: message.into(),
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax { .. })
    }
}

impl From<ParserError> for Error {
    fn from(err: ParserError) -> Self {
        // ParserError's Display prefixes the variant ("sql parser error: ...")
        let message = match err {
            ParserError::TokenizerError(msg) | ParserError::ParserError(msg) => msg,
            ParserError::RecursionLimitExceeded => "recursion limit exceeded".to_string(),
        };
        Error::syntax(message)
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;
