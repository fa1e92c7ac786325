//! Type Mapper: `TypeRef` → PostgreSQL type text. Pure function
//! over the Catalog; no side effects.

use crate::catalog::Catalog;
use crate::error::{MappingError, Result};
use crate::model::types::{BuiltIn, MappingContext, TypeRef};

pub fn map_type(type_ref: &TypeRef, context: MappingContext, catalog: &Catalog) -> Result<String> {
    match type_ref {
        TypeRef::BuiltIn(b) => map_builtin(b, context),
        TypeRef::UserDefined(q) => {
            if catalog.find_composite_type(q).is_none() {
                return Err(MappingError::UnknownCompositeType(q.clone()).into());
            }
            Ok(q.postgres_qualified())
        }
        TypeRef::ComplexSystem(q) => {
            if q.name.eq_ignore_ascii_case("XMLTYPE")
                && matches!(context, MappingContext::View | MappingContext::FunctionReturn)
            {
                Ok("xml".to_string())
            } else {
                Ok("jsonb".to_string())
            }
        }
    }
}

fn map_builtin(b: &BuiltIn, context: MappingContext) -> Result<String> {
    let name = b.oracle_name.to_uppercase();
    let text = match name.as_str() {
        "NUMBER" => match (b.precision, b.scale) {
            (Some(p), Some(0) | None) if p <= 19 => format!("numeric({p})"),
            (Some(p), Some(0) | None) => {
                let _ = p;
                "numeric".to_string()
            }
            (Some(p), Some(s)) => format!("numeric({p},{s})"),
            (None, _) => "numeric".to_string(),
        },
        "VARCHAR2" | "NVARCHAR2" => match b.length {
            Some(n) => format!("varchar({n})"),
            None => "varchar".to_string(),
        },
        "CHAR" | "NCHAR" => match b.length {
            Some(n) => format!("char({n})"),
            None => "char(1)".to_string(),
        },
        "DATE" => "timestamp(0)".to_string(),
        "TIMESTAMP" => match b.scale {
            Some(s) => format!("timestamp({s})"),
            None => "timestamp".to_string(),
        },
        "CLOB" | "NCLOB" | "LONG" => "text".to_string(),
        "BLOB" | "LONG RAW" => "bytea".to_string(),
        "RAW" => "bytea".to_string(),
        "BINARY_FLOAT" => "real".to_string(),
        "BINARY_DOUBLE" => "double precision".to_string(),
        "XMLTYPE" => {
            if matches!(context, MappingContext::Table) {
                "jsonb".to_string()
            } else {
                "xml".to_string()
            }
        }
        "INTEGER" | "INT" => "integer".to_string(),
        "FLOAT" => "double precision".to_string(),
        other => return Err(MappingError::UnsupportedOracleType(other.to_string()).into()),
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_with_scale_zero_and_small_precision_maps_to_bounded_numeric() {
        let b = BuiltIn {
            oracle_name: "NUMBER".into(),
            length: None,
            precision: Some(10),
            scale: Some(0),
        };
        let cat = Catalog::new();
        assert_eq!(
            map_type(&TypeRef::BuiltIn(b), MappingContext::Table, &cat).unwrap(),
            "numeric(10)"
        );
    }

    #[test]
    fn number_with_large_precision_and_no_scale_is_unbounded_numeric() {
        let b = BuiltIn {
            oracle_name: "NUMBER".into(),
            length: None,
            precision: Some(38),
            scale: Some(0),
        };
        let cat = Catalog::new();
        assert_eq!(
            map_type(&TypeRef::BuiltIn(b), MappingContext::Table, &cat).unwrap(),
            "numeric"
        );
    }

    #[test]
    fn number_with_precision_and_scale_maps_directly() {
        let b = BuiltIn {
            oracle_name: "NUMBER".into(),
            length: None,
            precision: Some(10),
            scale: Some(2),
        };
        let cat = Catalog::new();
        assert_eq!(
            map_type(&TypeRef::BuiltIn(b), MappingContext::Table, &cat).unwrap(),
            "numeric(10,2)"
        );
    }

    #[test]
    fn xmltype_is_jsonb_in_table_and_xml_elsewhere() {
        let b = BuiltIn::simple("XMLTYPE");
        let cat = Catalog::new();
        assert_eq!(
            map_type(&TypeRef::BuiltIn(b.clone()), MappingContext::Table, &cat).unwrap(),
            "jsonb"
        );
        assert_eq!(
            map_type(&TypeRef::BuiltIn(b), MappingContext::View, &cat).unwrap(),
            "xml"
        );
    }

    #[test]
    fn unknown_builtin_is_an_error() {
        let b = BuiltIn::simple("BFILE");
        let cat = Catalog::new();
        assert!(map_type(&TypeRef::BuiltIn(b), MappingContext::Table, &cat).is_err());
    }

    #[test]
    fn unresolved_user_defined_type_is_an_error() {
        use crate::model::ident::QualifiedName;
        let cat = Catalog::new();
        let q = QualifiedName::new("HR", "ADDRESS_T");
        assert!(map_type(&TypeRef::UserDefined(q), MappingContext::Table, &cat).is_err());
    }
}
