//! Case-insensitive schema-qualified identifiers.

use std::fmt;

/// An Oracle schema or PostgreSQL namespace name. Equality is
/// case-insensitive; the raw casing is kept around for diagnostics.
#[derive(Debug, Clone, Eq)]
pub struct SchemaName(String);

impl SchemaName {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Oracle-side canonical form: upper-case.
    pub fn oracle_form(&self) -> String {
        self.0.to_uppercase()
    }

    /// PostgreSQL-side canonical form: lower-case.
    pub fn postgres_form(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for SchemaName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl std::hash::Hash for SchemaName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_uppercase().hash(state)
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SchemaName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SchemaName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// `(SchemaName, identifier)`, equal case-insensitively on both parts.
#[derive(Debug, Clone, Eq, Hash)]
pub struct QualifiedName {
    pub schema: SchemaName,
    pub name: String,
}

impl QualifiedName {
    pub fn new(schema: impl Into<SchemaName>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Lower-cased `schema.name`, quoting either part that collides with a
    /// PostgreSQL reserved word.
    pub fn postgres_qualified(&self) -> String {
        format!(
            "{}.{}",
            crate::ddl::quote_ident(&self.schema.postgres_form()),
            crate::ddl::quote_ident(&self.name.to_lowercase())
        )
    }

    /// Flattened identifier for package members / type methods: `a__b`.
    pub fn flattened(owner: &str, member: &str) -> String {
        format!("{}__{}", owner.to_lowercase(), member.to_lowercase())
    }
}

impl PartialEq for QualifiedName {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_equality_is_case_insensitive() {
        assert_eq!(SchemaName::new("HR"), SchemaName::new("hr"));
    }

    #[test]
    fn qualified_name_equality_ignores_case_on_both_parts() {
        let a = QualifiedName::new("HR", "EMPLOYEES");
        let b = QualifiedName::new("hr", "employees");
        assert_eq!(a, b);
    }

    #[test]
    fn postgres_qualified_lowercases_and_quotes() {
        let q = QualifiedName::new("HR", "ORDER");
        assert_eq!(q.postgres_qualified(), "hr.\"order\"");
    }

    #[test]
    fn flattened_joins_with_double_underscore() {
        assert_eq!(QualifiedName::flattened("PKG", "DO_THING"), "pkg__do_thing");
    }
}
