use crate::model::ident::QualifiedName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    NoAction,
    Cascade,
    SetNull,
}

#[derive(Debug, Clone)]
pub enum ConstraintKind {
    PrimaryKey {
        columns: Vec<String>,
    },
    Unique {
        columns: Vec<String>,
    },
    ForeignKey {
        local_columns: Vec<String>,
        referenced: QualifiedName,
        referenced_columns: Vec<String>,
        on_delete: OnDelete,
    },
    Check {
        expression: String,
    },
    NotNull {
        column: String,
    },
}

/// An Oracle-assigned constraint, scoped to the owning table.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub name: String,
    pub table: QualifiedName,
    pub kind: ConstraintKind,
}

impl Constraint {
    /// Install ordering class used by the Dependency Orderer:
    /// all PKs, then UKs, then FKs (topological by referenced table), then
    /// CHECKs. NOT NULL is never installed separately.
    pub fn install_rank(&self) -> u8 {
        match self.kind {
            ConstraintKind::PrimaryKey { .. } => 0,
            ConstraintKind::Unique { .. } => 1,
            ConstraintKind::ForeignKey { .. } => 2,
            ConstraintKind::Check { .. } => 3,
            ConstraintKind::NotNull { .. } => 4,
        }
    }
}
