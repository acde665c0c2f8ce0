//! Content-addressed keys for parsed diffs.
//!
//! Keys are derived from a canonical JSON encoding of the model, which only
//! contains ordered sequences, so the same input text always produces the
//! same bytes and the same key.

use crate::{Diff, Hunk};
use sha2::{Digest, Sha256};

/// Stable serialization of a diff.
pub fn canonical_json(diff: &Diff) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(diff)
}

/// SHA-256 of the canonical JSON, as lowercase hex.
pub fn cache_key(diff: &Diff) -> serde_json::Result<String> {
    let bytes = canonical_json(diff)?;
    Ok(compute_hash(&bytes))
}

/// SHA-256 of a hunk's body as it appears in the diff (marker-prefixed
/// lines joined by `\n`). Ranges are not part of the hash, so a hunk that
/// only moved keeps its hash.
pub fn hunk_hash(hunk: &Hunk) -> String {
    let body = hunk
        .lines
        .iter()
        .map(|line| format!("{}{}", line.kind.marker(), line.content))
        .collect::<Vec<_>>()
        .join("\n");
    compute_hash(body.as_bytes())
}

fn compute_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_diff;

    const SAMPLE: &str = r#"diff --git a/file.txt b/file.txt
--- a/file.txt
+++ b/file.txt
@@ -1,2 +1,2 @@
-old
+new
"#;

    #[test]
    fn cache_key_is_deterministic() {
        let first = cache_key(&parse_diff(SAMPLE).unwrap()).unwrap();
        let second = cache_key(&parse_diff(SAMPLE).unwrap()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn cache_key_changes_with_content() {
        let changed = SAMPLE.replace("+new", "+newer");
        assert_ne!(
            cache_key(&parse_diff(SAMPLE).unwrap()).unwrap(),
            cache_key(&parse_diff(&changed).unwrap()).unwrap()
        );
    }

    #[test]
    fn canonical_json_uses_lowercase_kinds() {
        let json = canonical_json(&parse_diff(SAMPLE).unwrap()).unwrap();
        let text = String::from_utf8(json).unwrap();
        assert!(text.contains(r#""kind":"removed""#));
        assert!(text.contains(r#""kind":"added""#));
        assert!(text.starts_with(r#"{"files":[{"old_path":"file.txt""#));
    }

    #[test]
    fn canonical_json_round_trips() {
        let diff = parse_diff(SAMPLE).unwrap();
        let json = canonical_json(&diff).unwrap();
        let back: Diff = serde_json::from_slice(&json).unwrap();
        assert_eq!(back, diff);
    }

    #[test]
    fn hunk_hash_ignores_position() {
        let moved = SAMPLE.replace("@@ -1,2 +1,2 @@", "@@ -40,2 +41,2 @@");
        let a = &parse_diff(SAMPLE).unwrap().files[0].hunks[0];
        let b = &parse_diff(&moved).unwrap().files[0].hunks[0];
        assert_eq!(hunk_hash(a), hunk_hash(b));
    }

    #[test]
    fn hunk_hash_of_empty_hunk_is_hash_of_empty_string() {
        assert_eq!(
            hunk_hash(&Hunk::default()),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
