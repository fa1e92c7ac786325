use crate::ddl::RenderedSql;
use crate::model::sequence::Sequence;

/// Carries all six Oracle attributes to the `CREATE SEQUENCE`.
pub fn create_sequence(seq: &Sequence) -> RenderedSql {
    let cycle = if seq.cycle { "CYCLE" } else { "NO CYCLE" };
    RenderedSql::safe(format!(
        "CREATE SEQUENCE {} START WITH {} INCREMENT BY {} MINVALUE {} MAXVALUE {} CACHE {} {};",
        seq.name.postgres_qualified(),
        seq.start,
        seq.increment,
        seq.min,
        seq.max,
        seq.cache,
        cycle,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ident::QualifiedName;

    #[test]
    fn emits_all_six_attributes() {
        let seq = Sequence {
            name: QualifiedName::new("HR", "EMP_SEQ"),
            start: 1,
            increment: 1,
            min: 1,
            max: 999999999999999999,
            cache: 20,
            cycle: false,
        };
        assert_eq!(
            create_sequence(&seq).sql,
            "CREATE SEQUENCE hr.emp_seq START WITH 1 INCREMENT BY 1 MINVALUE 1 MAXVALUE 999999999999999999 CACHE 20 NO CYCLE;"
        );
    }
}
