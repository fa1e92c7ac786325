use crate::catalog::Catalog;
use crate::ddl::RenderedSql;
use crate::error::Result;
use crate::mapping::type_mapper::map_type;
use crate::model::composite::{MethodKind, Parameter, ParameterMode, TypeMethod};
use crate::model::types::MappingContext;

/// A type method flattens to a schema-level function/procedure with the
/// same stub pattern as a routine, receiver passed as a leading
/// parameter named `self`.
pub fn create_type_method_stub(method: &TypeMethod, catalog: &Catalog) -> Result<Vec<RenderedSql>> {
    let receiver_type = map_type(
        &crate::model::types::TypeRef::UserDefined(method.owner_type.clone()),
        MappingContext::Parameter,
        catalog,
    )?;
    let mut params = vec![format!("IN self {receiver_type}")];
    params.push(render_parameters(&method.parameters, catalog)?);
    let params = params.into_iter().filter(|p| !p.is_empty()).collect::<Vec<_>>().join(", ");

    let is_procedure = matches!(method.kind, MethodKind::Procedure);
    let stmt = if is_procedure {
        RenderedSql::safe(format!(
            "CREATE PROCEDURE {}({}) AS $$ BEGIN END; $$ LANGUAGE plpgsql;",
            method.flattened_name(),
            params
        ))
    } else {
        let return_type = match &method.return_type {
            Some(t) => map_type(t, MappingContext::FunctionReturn, catalog)?,
            None => "void".to_string(),
        };
        RenderedSql::safe(format!(
            "CREATE FUNCTION {}({}) RETURNS {} AS $$ BEGIN RETURN NULL; END; $$ LANGUAGE plpgsql;",
            method.flattened_name(),
            params,
            return_type
        ))
    };

    let comment = RenderedSql::safe(format!(
        "COMMENT ON {} {}({}) IS 'stub for {}.{}';",
        if is_procedure { "PROCEDURE" } else { "FUNCTION" },
        method.flattened_name(),
        params,
        method.owner_type,
        method.method_name
    ));

    Ok(vec![stmt, comment])
}

fn render_parameters(parameters: &[Parameter], catalog: &Catalog) -> Result<String> {
    let mut rendered = Vec::new();
    for p in parameters {
        let mode = match p.mode {
            ParameterMode::In => "IN",
            ParameterMode::Out => "OUT",
            ParameterMode::InOut => "INOUT",
        };
        let pg_type = map_type(&p.type_ref, MappingContext::Parameter, catalog)?;
        rendered.push(format!("{} {} {}", mode, p.name.to_lowercase(), pg_type));
    }
    Ok(rendered.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ident::QualifiedName;

    #[test]
    fn method_receiver_is_the_leading_parameter() {
        let method = TypeMethod {
            owner_type: QualifiedName::new("HR", "ADDRESS_T"),
            method_name: "FORMAT".into(),
            kind: MethodKind::Member,
            parameters: vec![],
            return_type: Some(crate::model::types::TypeRef::builtin("VARCHAR2")),
        };
        let catalog = Catalog::new();
        let stmts = create_type_method_stub(&method, &catalog).unwrap();
        assert!(stmts[0].sql.contains("address_t__format"));
        assert!(stmts[0].sql.contains("IN self hr.address_t"));
    }
}
