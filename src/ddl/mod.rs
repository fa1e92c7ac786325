//! DDL Emitters: pure functions from a Catalog entry to
//! PostgreSQL DDL text. Tables are emitted without FK/UK/CHECK constraints
//! (NOT NULL only); those are installed later by `crate::constraints`.

pub mod composite_type;
pub mod routine;
pub mod schema;
pub mod sequence;
pub mod table;
pub mod type_method;
pub mod view;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    Safe,
    Destructive,
}

#[derive(Debug, Clone)]
pub struct RenderedSql {
    pub sql: String,
    pub safety: Safety,
}

impl RenderedSql {
    pub fn safe(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            safety: Safety::Safe,
        }
    }

    pub fn destructive(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            safety: Safety::Destructive,
        }
    }
}

/// A pure Catalog entry → DDL text emitter.
pub trait SqlRenderer {
    fn to_sql(&self) -> Vec<RenderedSql>;
}

pub fn quote_ident(ident: &str) -> String {
    if is_plain_identifier(ident) {
        ident.to_string()
    } else {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}

pub fn escape_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn is_plain_identifier(ident: &str) -> bool {
    !ident.is_empty()
        && !is_reserved_word(ident)
        && ident
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && ident
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// A practical subset of PostgreSQL reserved words. Not exhaustive; the
/// ones migrated Oracle schemas actually collide with in practice.
const RESERVED_WORDS: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "both", "case",
    "cast", "check", "collate", "column", "constraint", "create", "current_date",
    "current_time", "current_timestamp", "current_user", "default", "deferrable", "desc",
    "distinct", "do", "else", "end", "except", "false", "fetch", "for", "foreign", "from",
    "grant", "group", "having", "in", "initially", "intersect", "into", "leading", "limit",
    "localtime", "localtimestamp", "not", "null", "offset", "on", "only", "or", "order", "order",
    "primary", "references", "select", "session_user", "some", "symmetric", "table", "then",
    "to", "trailing", "true", "union", "unique", "user", "using", "variadic", "when", "where",
    "window", "with",
];

fn is_reserved_word(ident: &str) -> bool {
    let lower = ident.to_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifiers_are_not_quoted() {
        assert_eq!(quote_ident("employees"), "employees");
    }

    #[test]
    fn reserved_words_are_quoted() {
        assert_eq!(quote_ident("order"), "\"order\"");
    }

    #[test]
    fn mixed_case_is_quoted() {
        assert_eq!(quote_ident("Employees"), "\"Employees\"");
    }

    #[test]
    fn escape_string_doubles_quotes() {
        assert_eq!(escape_string("o'brien"), "'o''brien'");
    }
}
