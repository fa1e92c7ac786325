//! Synonym Resolver. Applied during composite-type normalisation
//! and inside the SQL transformer — never for table column declarations.

use crate::catalog::Catalog;
use crate::model::ident::QualifiedName;
use tracing::warn;

/// Resolves `(currentSchema, name)` against the synonym index, falling back
/// to `PUBLIC`. Synonyms do not chain: if the target of a resolved synonym
/// is itself a synonym, that is logged as a data error and the first hop is
/// returned unchanged.
pub fn resolve(catalog: &Catalog, current_schema: &str, name: &str) -> Option<QualifiedName> {
    let synonym = catalog
        .lookup_synonym(current_schema, name)
        .or_else(|| catalog.lookup_synonym("PUBLIC", name))?;

    if catalog
        .lookup_synonym(&synonym.target.schema.oracle_form(), &synonym.target.name)
        .is_some()
    {
        warn!(
            synonym = %synonym.synonym_name,
            target = %synonym.target,
            "synonym chain detected; returning first hop"
        );
    }

    Some(synonym.target.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::synonym::Synonym;

    #[test]
    fn resolves_schema_local_synonym_first() {
        let mut cat = Catalog::new();
        cat.insert_synonym(Synonym {
            owner: "HR".into(),
            synonym_name: "EMP".into(),
            target: QualifiedName::new("HR", "EMPLOYEES"),
        });
        cat.insert_synonym(Synonym {
            owner: "PUBLIC".into(),
            synonym_name: "EMP".into(),
            target: QualifiedName::new("SCOTT", "EMP_VIEW"),
        });
        let resolved = resolve(&cat, "HR", "EMP").unwrap();
        assert_eq!(resolved, QualifiedName::new("HR", "EMPLOYEES"));
    }

    #[test]
    fn falls_back_to_public() {
        let mut cat = Catalog::new();
        cat.insert_synonym(Synonym {
            owner: "PUBLIC".into(),
            synonym_name: "DUAL_ALIAS".into(),
            target: QualifiedName::new("SYS", "DUAL"),
        });
        let resolved = resolve(&cat, "HR", "DUAL_ALIAS").unwrap();
        assert_eq!(resolved, QualifiedName::new("SYS", "DUAL"));
    }

    #[test]
    fn missing_synonym_returns_none() {
        let cat = Catalog::new();
        assert!(resolve(&cat, "HR", "NOPE").is_none());
    }
}
