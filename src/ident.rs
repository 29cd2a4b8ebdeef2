use crate::error::EaseError;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// A name that passed the bare-identifier check and is safe to interpolate
/// into DDL text. SQLite's statement API binds values but not identifiers,
/// so this gate is the only injection defense for table and column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidIdent(String);

impl ValidIdent {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accepts only bare identifiers: letters, digits, underscore, not starting
/// with a digit. Everything else (empty, whitespace, quotes, semicolons,
/// operators) fails closed before any SQL is built.
pub fn validate(name: &str) -> Result<ValidIdent, EaseError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex")
    });
    if re.is_match(name) {
        Ok(ValidIdent(name.to_string()))
    } else {
        Err(EaseError::InvalidIdentifier(format!(
            "{name:?} is not a bare identifier (letters, digits, underscore; must not start with a digit)"
        )))
    }
}

/// Loose filter for a column's declared type. SQLite accepts nearly any
/// type name, so this only blocks characters that could break out of the
/// DDL text (quotes, semicolons, comment starts).
pub fn validate_decl_type(decl_type: &str) -> Result<&str, EaseError> {
    let trimmed = decl_type.trim();
    if trimmed.is_empty() {
        return Err(EaseError::InvalidIdentifier(
            "declared type must not be empty".into(),
        ));
    }
    let unsafe_char = trimmed
        .chars()
        .any(|c| matches!(c, ';' | '\'' | '"' | '`' | '-' | '/') || c.is_control());
    if unsafe_char {
        return Err(EaseError::InvalidIdentifier(format!(
            "declared type {trimmed:?} contains characters not allowed in a type name"
        )));
    }
    Ok(trimmed)
}
