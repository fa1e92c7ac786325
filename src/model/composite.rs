use crate::model::ident::QualifiedName;
use crate::model::types::TypeRef;

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub type_ref: TypeRef,
}

/// A user-defined Oracle object type, mapped to a PostgreSQL composite
/// type. Invariant: every `UserDefined` attribute resolves to another
/// `CompositeType` in the Catalog after synonym resolution.
#[derive(Debug, Clone)]
pub struct CompositeType {
    pub name: QualifiedName,
    pub attributes: Vec<Attribute>,
}

impl CompositeType {
    /// The `QualifiedName`s this type depends on, for the Dependency
    /// Orderer. Only `UserDefined` attributes count as edges;
    /// built-ins and complex system types have no ordering dependency.
    pub fn dependencies(&self) -> impl Iterator<Item = &QualifiedName> {
        self.attributes.iter().filter_map(|a| match &a.type_ref {
            TypeRef::UserDefined(q) => Some(q),
            _ => None,
        })
    }
}

/// A flattened Oracle object-type method: `typename__methodname`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Member,
    Static,
    Function,
    Procedure,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub mode: ParameterMode,
    pub type_ref: TypeRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterMode {
    In,
    Out,
    InOut,
}

#[derive(Debug, Clone)]
pub struct TypeMethod {
    pub owner_type: QualifiedName,
    pub method_name: String,
    pub kind: MethodKind,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeRef>,
}

impl TypeMethod {
    pub fn flattened_name(&self) -> String {
        QualifiedName::flattened(&self.owner_type.name, &self.method_name)
    }
}
