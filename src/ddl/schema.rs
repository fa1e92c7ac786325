use crate::ddl::{RenderedSql, quote_ident};

pub fn create_schema(name: &str) -> RenderedSql {
    RenderedSql::safe(format!("CREATE SCHEMA IF NOT EXISTS {};", quote_ident(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_create_schema_if_not_exists() {
        assert_eq!(
            create_schema("hr").sql,
            "CREATE SCHEMA IF NOT EXISTS hr;"
        );
    }
}
