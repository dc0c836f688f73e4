use sha2::{Digest, Sha256};

/// Strong ETag for a JSON serialization: the quoted hex SHA-256 digest.
#[must_use]
pub fn etag(json: &str) -> String {
    let digest = Sha256::digest(json.as_bytes());
    format!("\"{}\"", hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etag_is_deterministic() {
        assert_eq!(etag(r#"{"id":1}"#), etag(r#"{"id":1}"#));
        assert_ne!(etag(r#"{"id":1}"#), etag(r#"{"id":2}"#));
    }

    #[test]
    fn test_etag_format() {
        let tag = etag("");
        assert_eq!(
            tag,
            "\"e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\""
        );
    }
}
