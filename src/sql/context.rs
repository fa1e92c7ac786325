//! Transformation Context: per-transformation state plus
//! read-only indices built once per session from the frozen Catalog.

use crate::catalog::Catalog;
use crate::model::ident::QualifiedName;
use std::collections::HashMap;

/// Built once per migration session from the frozen Catalog and shared by
/// every transformation in that session.
pub struct SchemaIndices<'a> {
    catalog: &'a Catalog,
}

impl<'a> SchemaIndices<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn column_composite_type(&self, table: &QualifiedName, column: &str) -> Option<&QualifiedName> {
        let table = self.catalog.find_table(table)?;
        let col = table
            .columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(column))?;
        match &col.type_ref {
            crate::model::types::TypeRef::UserDefined(q) => Some(q),
            _ => None,
        }
    }

    pub fn type_method(&self, owner_type: &QualifiedName, method_name: &str) -> bool {
        self.catalog.find_type_method(owner_type, method_name).is_some()
    }

    pub fn package_function(&self, package: &str, function: &str) -> bool {
        self.catalog
            .routines()
            .any(|r| r.package_member && r.name.name.eq_ignore_ascii_case(&format!("{package}.{function}")))
    }

    pub fn resolve_synonym(&self, current_schema: &str, name: &str) -> Option<QualifiedName> {
        crate::mapping::synonym_resolver::resolve(self.catalog, current_schema, name)
    }
}

/// Stack-scoped alias bindings; nested subqueries push/pop so inner aliases
/// never leak to the outer query.
#[derive(Debug, Default)]
pub struct AliasScopes {
    scopes: Vec<HashMap<String, QualifiedName>>,
}

impl AliasScopes {
    pub fn new() -> Self {
        Self { scopes: vec![HashMap::new()] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn bind(&mut self, alias: impl Into<String>, table: QualifiedName) {
        self.scopes.last_mut().expect("at least one scope").insert(alias.into(), table);
    }

    pub fn resolve(&self, alias: &str) -> Option<&QualifiedName> {
        self.scopes.iter().rev().find_map(|s| s.get(alias))
    }
}

/// Per-transformation value object: created once per call, dropped
/// when the call returns.
pub struct TransformContext<'a> {
    pub current_schema: String,
    pub aliases: AliasScopes,
    pub indices: SchemaIndices<'a>,
}

impl<'a> TransformContext<'a> {
    pub fn new(current_schema: impl Into<String>, catalog: &'a Catalog) -> Self {
        Self {
            current_schema: current_schema.into(),
            aliases: AliasScopes::new(),
            indices: SchemaIndices::new(catalog),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scope_alias_does_not_leak_to_outer() {
        let mut scopes = AliasScopes::new();
        scopes.bind("a", QualifiedName::new("HR", "EMPLOYEES"));
        scopes.push_scope();
        scopes.bind("b", QualifiedName::new("HR", "DEPARTMENTS"));
        assert!(scopes.resolve("b").is_some());
        scopes.pop_scope();
        assert!(scopes.resolve("b").is_none());
        assert!(scopes.resolve("a").is_some());
    }
}
