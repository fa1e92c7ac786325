use crate::model::column::Column;
use crate::model::constraint::Constraint;
use crate::model::ident::QualifiedName;

#[derive(Debug, Clone)]
pub struct Table {
    pub name: QualifiedName,
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
}

impl Table {
    /// Columns in Oracle order, as DDL emission requires.
    pub fn ordered_columns(&self) -> impl Iterator<Item = &Column> {
        let mut cols: Vec<&Column> = self.columns.iter().collect();
        cols.sort_by_key(|c| c.column_order);
        cols.into_iter()
    }
}
