//! The process-wide metadata store.
//!
//! Populated strictly in the order schemas → synonyms → composite types →
//! sequences → tables (constraints inline) → views → routines → type
//! methods → row counts. Read-only once the DDL/data phases begin.

pub mod utils;

use crate::model::composite::{CompositeType, TypeMethod};
use crate::model::ident::QualifiedName;
use crate::model::routine::Routine;
use crate::model::sequence::Sequence;
use crate::model::synonym::Synonym;
use crate::model::table::Table;
use crate::model::view::View;
use std::collections::BTreeMap;

/// Ordering key for `QualifiedName` so it can live in a `BTreeMap`: schema
/// then name, both case-folded (mirrors `QualifiedName`'s case-insensitive
/// `PartialEq`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CatalogKey(String, String);

impl From<&QualifiedName> for CatalogKey {
    fn from(q: &QualifiedName) -> Self {
        CatalogKey(q.schema.oracle_form(), q.name.to_uppercase())
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    pub schemas: Vec<String>,
    composite_types: BTreeMap<CatalogKey, CompositeType>,
    synonyms: BTreeMap<(String, String), Synonym>,
    sequences: BTreeMap<CatalogKey, Sequence>,
    tables: BTreeMap<CatalogKey, Table>,
    views: BTreeMap<CatalogKey, View>,
    routines: BTreeMap<CatalogKey, Routine>,
    type_methods: BTreeMap<CatalogKey, TypeMethod>,
    row_counts: BTreeMap<CatalogKey, u64>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every map and any derived cache. Implementations building
    /// caches from Catalog state (e.g. `sql::context::SchemaIndices`) must
    /// rebuild them after calling this.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn insert_schema(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.schemas.iter().any(|s| s.eq_ignore_ascii_case(&name)) {
            self.schemas.push(name);
        }
    }

    pub fn insert_synonym(&mut self, synonym: Synonym) {
        let key = (
            synonym.owner.to_uppercase(),
            synonym.synonym_name.to_uppercase(),
        );
        self.synonyms.insert(key, synonym);
    }

    pub fn lookup_synonym(&self, owner: &str, name: &str) -> Option<&Synonym> {
        self.synonyms
            .get(&(owner.to_uppercase(), name.to_uppercase()))
    }

    pub fn insert_composite_type(&mut self, ty: CompositeType) {
        self.composite_types.insert((&ty.name).into(), ty);
    }

    pub fn find_composite_type(&self, name: &QualifiedName) -> Option<&CompositeType> {
        self.composite_types.get(&name.into())
    }

    pub fn composite_types(&self) -> impl Iterator<Item = &CompositeType> {
        self.composite_types.values()
    }

    pub fn insert_sequence(&mut self, seq: Sequence) {
        self.sequences.insert((&seq.name).into(), seq);
    }

    pub fn sequences(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.values()
    }

    pub fn insert_table(&mut self, table: Table) {
        self.tables.insert((&table.name).into(), table);
    }

    pub fn find_table(&self, name: &QualifiedName) -> Option<&Table> {
        self.tables.get(&name.into())
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn insert_view(&mut self, view: View) {
        self.views.insert((&view.name).into(), view);
    }

    pub fn find_view(&self, name: &QualifiedName) -> Option<&View> {
        self.views.get(&name.into())
    }

    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.values()
    }

    pub fn insert_routine(&mut self, routine: Routine) {
        self.routines.insert((&routine.name).into(), routine);
    }

    pub fn routines(&self) -> impl Iterator<Item = &Routine> {
        self.routines.values()
    }

    pub fn insert_type_method(&mut self, method: TypeMethod) {
        let key = CatalogKey(
            method.owner_type.schema.oracle_form(),
            format!(
                "{}.{}",
                method.owner_type.name.to_uppercase(),
                method.method_name.to_uppercase()
            ),
        );
        self.type_methods.insert(key, method);
    }

    pub fn find_type_method(&self, owner: &QualifiedName, method_name: &str) -> Option<&TypeMethod> {
        let key = CatalogKey(
            owner.schema.oracle_form(),
            format!("{}.{}", owner.name.to_uppercase(), method_name.to_uppercase()),
        );
        self.type_methods.get(&key)
    }

    pub fn insert_row_count(&mut self, table: &QualifiedName, count: u64) {
        self.row_counts.insert(table.into(), count);
    }

    pub fn row_count(&self, table: &QualifiedName) -> Option<u64> {
        self.row_counts.get(&table.into()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::column::Column;
    use crate::model::types::TypeRef;

    fn table(schema: &str, name: &str) -> Table {
        Table {
            name: QualifiedName::new(schema, name),
            columns: vec![Column {
                name: "id".into(),
                type_ref: TypeRef::builtin("NUMBER"),
                nullable: false,
                default_expr: None,
                column_order: 0,
            }],
            constraints: vec![],
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut cat = Catalog::new();
        cat.insert_table(table("HR", "EMPLOYEES"));
        assert!(cat.find_table(&QualifiedName::new("hr", "employees")).is_some());
    }

    #[test]
    fn reset_clears_every_map() {
        let mut cat = Catalog::new();
        cat.insert_table(table("HR", "EMPLOYEES"));
        cat.insert_schema("HR");
        cat.reset();
        assert!(cat.tables().next().is_none());
        assert!(cat.schemas.is_empty());
    }

    #[test]
    fn synonym_lookup_keys_on_owner_and_name() {
        let mut cat = Catalog::new();
        cat.insert_synonym(Synonym {
            owner: "HR".into(),
            synonym_name: "EMP".into(),
            target: QualifiedName::new("HR", "EMPLOYEES"),
        });
        assert!(cat.lookup_synonym("hr", "emp").is_some());
        assert!(cat.lookup_synonym("other", "emp").is_none());
    }
}
