use crate::catalog::Catalog;
use crate::ddl::{RenderedSql, quote_ident};
use crate::error::Result;
use crate::mapping::type_mapper::map_type;
use crate::model::types::MappingContext;
use crate::model::view::View;

/// `CREATE VIEW q AS SELECT NULL::T1 AS c1, …, NULL::Tn AS cn WHERE false`
/// — the view body is transformed and implemented separately, later.
pub fn create_view_stub(view: &View, catalog: &Catalog) -> Result<RenderedSql> {
    let mut projections = Vec::new();
    for column in &view.columns {
        let pg_type = map_type(&column.type_ref, MappingContext::View, catalog)?;
        projections.push(format!(
            "NULL::{} AS {}",
            pg_type,
            quote_ident(&column.name.to_lowercase())
        ));
    }

    Ok(RenderedSql::safe(format!(
        "CREATE VIEW {} AS SELECT {} WHERE false;",
        view.name.postgres_qualified(),
        projections.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::column::Column;
    use crate::model::ident::QualifiedName;
    use crate::model::types::TypeRef;

    #[test]
    fn stub_selects_typed_nulls_with_false_filter() {
        let view = View {
            name: QualifiedName::new("HR", "EMP_SUMMARY"),
            columns: vec![Column {
                name: "FULL_NAME".into(),
                type_ref: TypeRef::builtin("VARCHAR2"),
                nullable: true,
                default_expr: None,
                column_order: 0,
            }],
            oracle_sql_text: "SELECT name AS full_name FROM employees".into(),
        };
        let catalog = Catalog::new();
        let rendered = create_view_stub(&view, &catalog).unwrap();
        assert_eq!(
            rendered.sql,
            "CREATE VIEW hr.emp_summary AS SELECT NULL::varchar AS full_name WHERE false;"
        );
    }
}
