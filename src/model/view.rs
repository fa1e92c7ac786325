use crate::model::column::Column;
use crate::model::ident::QualifiedName;

#[derive(Debug, Clone)]
pub struct View {
    pub name: QualifiedName,
    pub columns: Vec<Column>,
    pub oracle_sql_text: String,
}
