/// Oracle-supplied schemas that are never migrated.
const SYSTEM_SCHEMAS: &[&str] = &[
    "SYS", "SYSTEM", "OUTLN", "CTXSYS", "XDB", "MDSYS", "ORDSYS", "ORDDATA", "WMSYS", "DBSNMP",
    "APPQOSSYS", "GSMADMIN_INTERNAL", "AUDSYS",
];

/// True if `schema` is an Oracle-supplied schema that extraction must skip
/// regardless of the configured `SchemaFilter`.
pub fn is_system_schema(schema: &str) -> bool {
    SYSTEM_SCHEMAS.iter().any(|s| s.eq_ignore_ascii_case(schema))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sys_and_system_are_excluded() {
        assert!(is_system_schema("SYS"));
        assert!(is_system_schema("system"));
    }

    #[test]
    fn an_ordinary_schema_is_not_excluded() {
        assert!(!is_system_schema("HR"));
    }
}
