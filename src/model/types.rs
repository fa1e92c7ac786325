//! `TypeRef` — the tagged variant over Oracle column/parameter types.

use crate::model::ident::QualifiedName;

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltIn {
    pub oracle_name: String,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<i32>,
}

impl BuiltIn {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            oracle_name: name.into(),
            length: None,
            precision: None,
            scale: None,
        }
    }
}

/// Where a `TypeRef` is being mapped from — the XMLTYPE exception
/// depends on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingContext {
    Table,
    View,
    FunctionReturn,
    Parameter,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    BuiltIn(BuiltIn),
    UserDefined(QualifiedName),
    /// Matches owner "PUBLIC" too, reflecting PUBLIC synonyms over SYS types.
    ComplexSystem(QualifiedName),
}

impl TypeRef {
    pub fn builtin(name: impl Into<String>) -> Self {
        TypeRef::BuiltIn(BuiltIn::simple(name))
    }

    /// Known complex/opaque Oracle system types: ANYDATA, XMLTYPE, AQ$_*,
    /// SDO_GEOMETRY, owned by SYS or exposed via a PUBLIC synonym.
    pub fn is_complex_system_name(owner: &str, name: &str) -> bool {
        let owner_matches = owner.eq_ignore_ascii_case("SYS") || owner.eq_ignore_ascii_case("PUBLIC");
        if !owner_matches {
            return false;
        }
        let upper = name.to_uppercase();
        upper == "ANYDATA"
            || upper == "XMLTYPE"
            || upper == "SDO_GEOMETRY"
            || upper.starts_with("AQ$_")
    }

    pub fn is_xmltype(&self) -> bool {
        matches!(self, TypeRef::ComplexSystem(q) if q.name.eq_ignore_ascii_case("XMLTYPE"))
    }
}
