// hasher.rs — SHA-256 hashing utilities.
//
// Audit payload hashes are SHA-256, hex-encoded: a 64-character lowercase
// string, readable and JSON-friendly. serde_json's object maps iterate in
// sorted key order, so serializing a value yields a canonical string and
// hashing it is deterministic.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Hash arbitrary bytes, returning a lowercase hex-encoded SHA-256 string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Hash a UTF-8 string.
pub fn hash_str(s: &str) -> String {
    hash_bytes(s.as_bytes())
}

/// Hash a JSON value via its canonical (sorted-key) serialization.
pub fn hash_value(value: &Value) -> String {
    // Serializing a Value cannot fail.
    hash_str(&value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hash_determinism() {
        assert_eq!(hash_bytes(b"hello world"), hash_bytes(b"hello world"));
    }

    #[test]
    fn hash_uniqueness() {
        assert_ne!(hash_bytes(b"hello"), hash_bytes(b"world"));
    }

    #[test]
    fn hash_known_value() {
        // SHA-256("") = e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855
        assert_eq!(
            hash_str(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn value_hash_ignores_key_insertion_order() {
        let a = json!({"b": 1, "a": 2});
        let b: Value = serde_json::from_str(r#"{"a": 2, "b": 1}"#).unwrap();
        assert_eq!(hash_value(&a), hash_value(&b));
    }
}
