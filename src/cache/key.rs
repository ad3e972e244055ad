//! Cache key generation using SHA-256 hashes

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Hex characters kept from the digest (128 bits).
const DIGEST_HEX_LEN: usize = 32;

/// Generate a deterministic cache key from a namespace and a parameter bag.
///
/// The parameters are serialized to JSON, object members are sorted by name
/// at every depth and null members dropped, and the canonical bytes are hashed
/// with SHA-256. The key is `namespace:<first 128 bits of the digest as hex>`,
/// so the same logical parameters give the same key however they were built.
///
/// # Panics
///
/// Panics if `params` cannot be represented as JSON (for example a map with
/// non-string keys). Parameter shapes are fixed per resource kind, so this is
/// a programming error rather than a runtime condition.
pub fn cache_key<P: Serialize + ?Sized>(namespace: &str, params: &P) -> String {
    let value = serde_json::to_value(params).expect("cache key parameters must serialize to JSON");

    let mut canonical = String::new();
    write_canonical(&value, &mut canonical);

    let digest = Sha256::digest(canonical.as_bytes());
    let hex = format!("{:x}", digest);

    format!("{}:{}", namespace, &hex[..DIGEST_HEX_LEN])
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut members: Vec<_> = map.iter().filter(|(_, v)| !v.is_null()).collect();
            members.sort_by(|(a, _), (b, _)| a.cmp(b));

            out.push('{');
            for (i, (name, member)) in members.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Value::String's Display writes a quoted, escaped JSON string
                out.push_str(&Value::String(name.clone()).to_string());
                out.push(':');
                write_canonical(member, out);
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
