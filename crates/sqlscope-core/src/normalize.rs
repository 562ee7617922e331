//! Identifier normalization
//!
//! Produces the stable string form of identifiers used for comparisons and as
//! map keys. The tokenizer already strips quote characters and resolves
//! escapes, so normalizing a parsed [`Ident`] is only a matter of case.

use sqlparser::ast::{Ident, ObjectName};

/// Case rule for unquoted identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierCase {
    /// Keep the identifier as written (MySQL family)
    Preserve,
    /// Lowercase unquoted identifiers, keep quoted ones verbatim (PostgreSQL)
    FoldLower,
}

/// Normalize a parsed identifier
pub fn normalize_identifier(ident: &Ident, case: IdentifierCase) -> String {
    match (case, ident.quote_style) {
        (IdentifierCase::FoldLower, None) => ident.value.to_lowercase(),
        _ => ident.value.clone(),
    }
}

/// Normalize every component of a dotted name
pub fn normalize_object_name(name: &ObjectName, case: IdentifierCase) -> Vec<String> {
    name.0
        .iter()
        .map(|ident| normalize_identifier(ident, case))
        .collect()
}

/// Normalize identifier text that did not come from a parse tree
///
/// Strips one level of matching backtick or double quotes and un-doubles the
/// quote character inside. Case folding only applies to unquoted text.
pub fn normalize_raw_identifier(raw: &str, case: IdentifierCase) -> String {
    let raw = raw.trim();
    for quote in ['`', '"'] {
        if let Some(inner) = raw
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            let doubled: String = [quote, quote].iter().collect();
            return inner.replace(&doubled, &quote.to_string());
        }
    }
    match case {
        IdentifierCase::Preserve => raw.to_string(),
        IdentifierCase::FoldLower => raw.to_lowercase(),
    }
}
