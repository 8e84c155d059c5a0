use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest.
pub const DOC_ID_LEN: usize = 16;

/// Derive the staging partition id for a source key.
///
/// SHA-256 over the UTF-8 key, lowercase hex, truncated to [`DOC_ID_LEN`].
/// Bucket and content do not participate, so re-running the same key always
/// lands in the same partition.
pub fn doc_id(source_key: &str) -> String {
    let digest = Sha256::digest(source_key.as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(DOC_ID_LEN);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_for_same_key() {
        assert_eq!(doc_id("raw/example.pdf"), doc_id("raw/example.pdf"));
    }

    #[test]
    fn known_digest_prefix() {
        // sha256("abc") = ba7816bf8f01cfea414140de5dae2223...
        assert_eq!(doc_id("abc"), "ba7816bf8f01cfea");
    }

    #[test]
    fn differs_between_keys() {
        assert_ne!(doc_id("raw/a.pdf"), doc_id("raw/b.pdf"));
    }

    #[test]
    fn fixed_length_lowercase_hex() {
        let id = doc_id("raw/דוח.pdf");
        assert_eq!(id.len(), DOC_ID_LEN);
        assert!(
            id.chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }
}
