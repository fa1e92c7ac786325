//! Complex-Value Serializer: encodes a value into the target's
//! bulk-load (CSV/COPY) text. Stateless: holds no connection, produces no
//! side effects.

use crate::model::types::TypeRef;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// The CSV null sentinel is configured once per transfer run; the
/// default matches `sqlx`'s `COPY` convention.
pub const DEFAULT_NULL_SENTINEL: &str = "\\N";

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Scalar(String),
    Blob(Vec<u8>),
    Clob(String),
    Composite(Vec<Value>),
    /// A value whose Oracle type could not be structurally decomposed; the
    /// raw bytes are the fallback payload.
    Opaque { raw: Vec<u8>, structured: Option<String> },
}

pub fn serialize(value: &Value, type_ref: &TypeRef, null_sentinel: &str) -> String {
    match (value, type_ref) {
        (Value::Null, _) => null_sentinel.to_string(),
        (Value::Scalar(s), TypeRef::BuiltIn(_)) => csv_escape(s),
        (Value::Blob(bytes), TypeRef::BuiltIn(_)) => format!("\\x{}", hex_encode(bytes)),
        (Value::Clob(text), TypeRef::BuiltIn(_)) => csv_escape(text),
        (Value::Composite(attrs), TypeRef::UserDefined(_)) => serialize_composite(attrs, null_sentinel),
        (Value::Opaque { raw, structured }, TypeRef::ComplexSystem(q)) => {
            let body = structured
                .clone()
                .unwrap_or_else(|| format!("\"{}\"", BASE64.encode(raw)));
            csv_escape(&format!(
                "{{\"oracleType\":\"{}.{}\",\"value\":{}}}",
                q.schema, q.name, body
            ))
        }
        (value, type_ref) => {
            // Mismatched shape: fall back to the scalar path rather than panic.
            let as_text = match value {
                Value::Scalar(s) | Value::Clob(s) => s.clone(),
                _ => String::new(),
            };
            let _ = type_ref;
            csv_escape(&as_text)
        }
    }
}

fn serialize_composite(attrs: &[Value], null_sentinel: &str) -> String {
    let rendered: Vec<String> = attrs
        .iter()
        .map(|a| match a {
            Value::Null => String::new(),
            Value::Scalar(s) | Value::Clob(s) => quote_composite_attr(s),
            _ => quote_composite_attr(&serialize(a, &TypeRef::builtin("__nested__"), null_sentinel)),
        })
        .collect();
    format!("({})", rendered.join(","))
}

/// Commas, parens, or quotes inside an attribute require double-quoting the
/// attribute and doubling internal quotes.
fn quote_composite_attr(s: &str) -> String {
    if s.contains(['"', ',', '(', ')']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn csv_escape(s: &str) -> String {
    if s.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_becomes_sentinel() {
        assert_eq!(
            serialize(&Value::Null, &TypeRef::builtin("NUMBER"), DEFAULT_NULL_SENTINEL),
            "\\N"
        );
    }

    #[test]
    fn blob_is_hex_encoded_with_backslash_x_prefix() {
        let v = Value::Blob(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(
            serialize(&v, &TypeRef::builtin("BLOB"), DEFAULT_NULL_SENTINEL),
            "\\xdeadbeef"
        );
    }

    #[test]
    fn composite_attribute_with_comma_is_quoted() {
        let v = Value::Composite(vec![
            Value::Scalar("Springfield, IL".into()),
            Value::Null,
        ]);
        let q = crate::model::ident::QualifiedName::new("HR", "ADDRESS_T");
        assert_eq!(
            serialize(&v, &TypeRef::UserDefined(q), DEFAULT_NULL_SENTINEL),
            "(\"Springfield, IL\",)"
        );
    }

    #[test]
    fn complex_system_value_falls_back_to_base64_when_unstructured() {
        let v = Value::Opaque {
            raw: vec![1, 2, 3],
            structured: None,
        };
        let q = crate::model::ident::QualifiedName::new("SYS", "ANYDATA");
        let out = serialize(&v, &TypeRef::ComplexSystem(q), DEFAULT_NULL_SENTINEL);
        assert!(out.contains("SYS.ANYDATA"));
        assert!(out.contains(&BASE64.encode([1, 2, 3])));
    }
}
