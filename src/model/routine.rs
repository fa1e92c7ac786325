use crate::model::composite::Parameter;
use crate::model::ident::QualifiedName;
use crate::model::types::TypeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    Function,
    Procedure,
}

/// A standalone or package-member Oracle routine. Package members are
/// flattened on output: `packagename__routinename`.
#[derive(Debug, Clone)]
pub struct Routine {
    pub name: QualifiedName,
    pub kind: RoutineKind,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeRef>,
    pub package_member: bool,
    pub oracle_body_text: String,
}

impl Routine {
    /// The identifier to emit on the PostgreSQL side.
    pub fn emitted_name(&self) -> String {
        if self.package_member {
            if let Some((package, routine)) = self.name.name.split_once('.') {
                return QualifiedName::flattened(package, routine);
            }
        }
        self.name.name.to_lowercase()
    }
}
