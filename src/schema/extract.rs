use std::sync::LazyLock;

use regex::Regex;

use crate::error::PipelineError;

static CREATE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?([^\s(]+)")
        .expect("CREATE TABLE pattern is valid")
});

const QUOTE_CHARS: &[char] = &['`', '"', '[', ']'];

/// Recover the table name declared by the first `CREATE TABLE` in a schema.
///
/// Only the identifier is checked; the rest of the statement is left for SQLite to reject.
pub fn extract_table_name(schema: &str) -> Result<String, PipelineError> {
    let name = CREATE_TABLE
        .captures(schema)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_matches(QUOTE_CHARS))
        .ok_or(PipelineError::SchemaParse)?;

    if name.is_empty() {
        return Err(PipelineError::SchemaParse);
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name() {
        let name = extract_table_name("CREATE TABLE users (id INTEGER);").unwrap();
        assert_eq!(name, "users");
    }

    #[test]
    fn test_if_not_exists_and_quotes() {
        let name =
            extract_table_name("CREATE TABLE IF NOT EXISTS \"my_table\" (id INTEGER)").unwrap();
        assert_eq!(name, "my_table");
    }

    #[test]
    fn test_case_insensitive_and_brackets() {
        assert_eq!(
            extract_table_name("create table [orders](id int)").unwrap(),
            "orders"
        );
        assert_eq!(
            extract_table_name("Create\n  Table\t`line items` (id int)").unwrap(),
            "line"
        );
    }

    #[test]
    fn test_first_statement_wins() {
        let schema = "-- generated\nCREATE TABLE a (x TEXT);\nCREATE TABLE b (y TEXT);";
        assert_eq!(extract_table_name(schema).unwrap(), "a");
    }

    #[test]
    fn test_no_create_table() {
        assert!(matches!(
            extract_table_name("INVALID SQL STATEMENT"),
            Err(PipelineError::SchemaParse)
        ));
        assert!(matches!(
            extract_table_name("CREATE INDEX idx ON t (x)"),
            Err(PipelineError::SchemaParse)
        ));
    }

    #[test]
    fn test_only_quotes_is_rejected() {
        assert!(matches!(
            extract_table_name("CREATE TABLE \"\" (x TEXT)"),
            Err(PipelineError::SchemaParse)
        ));
    }
}
