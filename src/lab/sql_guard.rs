//! Text-level guard for the read-only SQL console.
//!
//! This is the first line only; execution also runs on a read-only
//! connection and rejects statements SQLite reports as writing.

use thiserror::Error;

const FORBIDDEN: &[&str] = &["insert", "update", "delete", "drop", "alter", "create", "truncate"];

#[derive(Debug, Error, PartialEq)]
pub enum SqlGuardError {
    #[error("Query empty.")]
    Empty,
    #[error("Only safe SELECT queries allowed.")]
    NotSelect,
    #[error("Only a single statement is allowed.")]
    MultipleStatements,
}

/// Validate a console query. Returns it trimmed, without trailing `;`.
pub fn validate(query: &str) -> Result<&str, SqlGuardError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(SqlGuardError::Empty);
    }

    let first = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if FORBIDDEN.contains(&first.as_str()) || !starts_with_select(trimmed) {
        return Err(SqlGuardError::NotSelect);
    }

    let statement = trimmed.trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    if has_separator(statement) {
        return Err(SqlGuardError::MultipleStatements);
    }
    Ok(statement)
}

/// Client-side check: the query must begin with `select`.
pub fn starts_with_select(query: &str) -> bool {
    query
        .trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("select"))
}

/// Whether a `;` appears outside quoted text.
fn has_separator(sql: &str) -> bool {
    let mut quote: Option<char> = None;
    for c in sql.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' || c == '`' => quote = Some(c),
            None if c == ';' => return true,
            None => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_select_and_strips_semicolon() {
        assert_eq!(
            validate("  SELECT * FROM patients LIMIT 10;  "),
            Ok("SELECT * FROM patients LIMIT 10")
        );
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(validate("   "), Err(SqlGuardError::Empty));
    }

    #[test]
    fn rejects_writes() {
        assert_eq!(validate("DELETE FROM patients"), Err(SqlGuardError::NotSelect));
        assert_eq!(validate("drop table tests"), Err(SqlGuardError::NotSelect));
        assert_eq!(validate("PRAGMA table_info(tests)"), Err(SqlGuardError::NotSelect));
        assert_eq!(validate("with x as (select 1) select * from x"), Err(SqlGuardError::NotSelect));
    }

    #[test]
    fn rejects_stacked_statements() {
        assert_eq!(
            validate("select 1; delete from patients"),
            Err(SqlGuardError::MultipleStatements)
        );
    }

    #[test]
    fn semicolon_inside_string_is_fine() {
        assert_eq!(
            validate("select * from patients where address = 'a;b';"),
            Ok("select * from patients where address = 'a;b'")
        );
    }

    #[test]
    fn select_prefix_check() {
        assert!(starts_with_select("select 1"));
        assert!(starts_with_select("  SeLeCt 1"));
        assert!(!starts_with_select("sel"));
        assert!(!starts_with_select("update x"));
    }
}
