//! Deterministic content hashing for provenance entries.

use serde_json::Value;
use sha2::Digest;
use sha2::Sha256;

use crate::entry::ProvenanceEntry;
use crate::error::Result;

/// Compact JSON with object keys sorted at every depth.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Lowercase hex SHA-256 of `value` in canonical form, ignoring a top-level
/// `hash` key.
pub fn hash_value(value: &Value) -> String {
    let canonical = match value {
        Value::Object(map) if map.contains_key("hash") => {
            let mut without_hash = map.clone();
            without_hash.remove("hash");
            canonical_json(&Value::Object(without_hash))
        }
        other => canonical_json(other),
    };
    format!("{:x}", Sha256::digest(canonical.as_bytes()))
}

/// Digest over every field of `entry` except `hash` itself.
pub fn compute_entry_hash(entry: &ProvenanceEntry) -> Result<String> {
    Ok(hash_value(&serde_json::to_value(entry)?))
}
