use crate::catalog::Catalog;
use crate::ddl::{RenderedSql, quote_ident};
use crate::error::Result;
use crate::mapping::type_mapper::map_type;
use crate::model::composite::CompositeType;
use crate::model::types::MappingContext;

/// Composite types must be emitted in dependency order; the caller
/// is responsible for ordering via `mapping::depgraph`.
pub fn create_composite_type(ty: &CompositeType, catalog: &Catalog) -> Result<RenderedSql> {
    let mut attrs = Vec::new();
    for attr in &ty.attributes {
        let pg_type = map_type(&attr.type_ref, MappingContext::Table, catalog)?;
        attrs.push(format!("{} {}", quote_ident(&attr.name.to_lowercase()), pg_type));
    }

    Ok(RenderedSql::safe(format!(
        "CREATE TYPE {} AS ({});",
        ty.name.postgres_qualified(),
        attrs.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::composite::Attribute;
    use crate::model::ident::QualifiedName;
    use crate::model::types::TypeRef;

    #[test]
    fn renders_attributes_in_order() {
        let ty = CompositeType {
            name: QualifiedName::new("HR", "ADDRESS_T"),
            attributes: vec![
                Attribute {
                    name: "STREET".into(),
                    type_ref: TypeRef::builtin("VARCHAR2"),
                },
                Attribute {
                    name: "CITY".into(),
                    type_ref: TypeRef::builtin("VARCHAR2"),
                },
            ],
        };
        let catalog = Catalog::new();
        let rendered = create_composite_type(&ty, &catalog).unwrap();
        assert_eq!(
            rendered.sql,
            "CREATE TYPE hr.address_t AS (street varchar, city varchar);"
        );
    }
}
