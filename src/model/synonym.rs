use crate::model::ident::QualifiedName;

/// An Oracle synonym. `owner` is either a concrete schema or `"PUBLIC"`.
#[derive(Debug, Clone)]
pub struct Synonym {
    pub owner: String,
    pub synonym_name: String,
    pub target: QualifiedName,
}
