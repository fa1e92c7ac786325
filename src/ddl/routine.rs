use crate::catalog::Catalog;
use crate::ddl::RenderedSql;
use crate::error::Result;
use crate::mapping::type_mapper::map_type;
use crate::model::composite::{Parameter, ParameterMode};
use crate::model::routine::{Routine, RoutineKind};
use crate::model::types::MappingContext;
use crate::sql::parser::{self, ParseResult, StartRule};
use tracing::warn;

/// Checks that the original Oracle signature at least parses as a
/// function/procedure header; the stub body doesn't depend on it, but a
/// signature the grammar can't recognize is worth a warning before it's
/// silently replaced with `RETURN NULL`.
fn validate_signature(routine: &Routine) {
    if routine.oracle_body_text.is_empty() {
        return;
    }
    let start_rule = match routine.kind {
        RoutineKind::Function => StartRule::FunctionBody,
        RoutineKind::Procedure => StartRule::ProcedureBody,
    };
    if let ParseResult::Errors(errors) = parser::parse(&routine.oracle_body_text, start_rule) {
        warn!(
            routine = %routine.name,
            error = %errors[0].message,
            "routine body does not match the expected signature shape"
        );
    }
}

/// Function stub returns `NULL`; procedure stub has an empty body. Both
/// carry a comment preserving the original Oracle qualified name.
pub fn create_routine_stub(routine: &Routine, catalog: &Catalog) -> Result<Vec<RenderedSql>> {
    validate_signature(routine);
    let params = render_parameters(&routine.parameters, catalog)?;
    let mut stmts = Vec::new();

    match routine.kind {
        RoutineKind::Function => {
            let return_type = match &routine.return_type {
                Some(t) => map_type(t, MappingContext::FunctionReturn, catalog)?,
                None => "void".to_string(),
            };
            stmts.push(RenderedSql::safe(format!(
                "CREATE FUNCTION {}({}) RETURNS {} AS $$ BEGIN RETURN NULL; END; $$ LANGUAGE plpgsql;",
                routine.emitted_name(),
                params,
                return_type
            )));
        }
        RoutineKind::Procedure => {
            stmts.push(RenderedSql::safe(format!(
                "CREATE PROCEDURE {}({}) AS $$ BEGIN END; $$ LANGUAGE plpgsql;",
                routine.emitted_name(),
                params
            )));
        }
    }

    stmts.push(RenderedSql::safe(format!(
        "COMMENT ON {} {}({}) IS 'stub for {}';",
        match routine.kind {
            RoutineKind::Function => "FUNCTION",
            RoutineKind::Procedure => "PROCEDURE",
        },
        routine.emitted_name(),
        params,
        routine.name
    )));

    Ok(stmts)
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
    fn function_stub_returns_null_and_keeps_original_name_in_a_comment() {
        let routine = Routine {
            name: QualifiedName::new("HR", "GET_NAME"),
            kind: RoutineKind::Function,
            parameters: vec![],
            return_type: Some(crate::model::types::TypeRef::builtin("VARCHAR2")),
            package_member: false,
            oracle_body_text: "BEGIN RETURN 'x'; END;".into(),
        };
        let catalog = Catalog::new();
        let stmts = create_routine_stub(&routine, &catalog).unwrap();
        assert!(stmts[0].sql.contains("RETURN NULL"));
        assert!(stmts[1].sql.contains("HR.GET_NAME"));
    }

    #[test]
    fn package_member_routine_is_flattened() {
        let routine = Routine {
            name: QualifiedName::new("HR", "PKG_EMP.GET_NAME"),
            kind: RoutineKind::Function,
            parameters: vec![],
            return_type: Some(crate::model::types::TypeRef::builtin("VARCHAR2")),
            package_member: true,
            oracle_body_text: String::new(),
        };
        assert_eq!(routine.emitted_name(), "pkg_emp__get_name");
    }
}
