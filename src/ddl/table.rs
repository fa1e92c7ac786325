use crate::catalog::Catalog;
use crate::ddl::{RenderedSql, quote_ident};
use crate::error::Result;
use crate::mapping::type_mapper::map_type;
use crate::model::table::Table;
use crate::model::types::MappingContext;

/// Emits `CREATE TABLE` with columns in Oracle order and NOT NULL only;
/// PK/UK/FK/CHECK constraints are installed separately by the constraint
/// installer.
pub fn create_table(table: &Table, catalog: &Catalog) -> Result<RenderedSql> {
    let mut lines = Vec::new();
    for column in table.ordered_columns() {
        let pg_type = map_type(&column.type_ref, MappingContext::Table, catalog)?;
        let mut line = format!("{} {}", quote_ident(&column.name.to_lowercase()), pg_type);
        if !column.nullable {
            line.push_str(" NOT NULL");
        }
        if let Some(default_expr) = &column.default_expr {
            line.push_str(&format!(" DEFAULT {default_expr}"));
        }
        lines.push(line);
    }

    Ok(RenderedSql::safe(format!(
        "CREATE TABLE {} (\n  {}\n);",
        table.name.postgres_qualified(),
        lines.join(",\n  ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::column::Column;
    use crate::model::ident::QualifiedName;
    use crate::model::types::TypeRef;

    #[test]
    fn renders_columns_in_oracle_order_with_not_null() {
        let table = Table {
            name: QualifiedName::new("HR", "EMPLOYEES"),
            columns: vec![
                Column {
                    name: "NAME".into(),
                    type_ref: TypeRef::builtin("VARCHAR2"),
                    nullable: true,
                    default_expr: None,
                    column_order: 1,
                },
                Column {
                    name: "ID".into(),
                    type_ref: TypeRef::BuiltIn(crate::model::types::BuiltIn {
                        oracle_name: "NUMBER".into(),
                        length: None,
                        precision: Some(10),
                        scale: Some(0),
                    }),
                    nullable: false,
                    default_expr: None,
                    column_order: 0,
                },
            ],
            constraints: vec![],
        };
        let catalog = Catalog::new();
        let rendered = create_table(&table, &catalog).unwrap();
        assert!(rendered.sql.contains("id numeric(10) NOT NULL"));
        let id_pos = rendered.sql.find("id numeric").unwrap();
        let name_pos = rendered.sql.find("name varchar").unwrap();
        assert!(id_pos < name_pos);
    }
}
