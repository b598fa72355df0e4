//! Deterministic digest anonymizer

use super::{Anonymizer, FieldContext};
use crate::domain::Result;
use sha2::{Digest, Sha256};

/// Replaces the value with its SHA-256 hex digest.
///
/// Deterministic: the same input always maps to the same output, so equal
/// values remain correlatable after anonymization without being
/// reversible.
pub struct HashAnonymizer;

impl Anonymizer for HashAnonymizer {
    fn id(&self) -> &'static str {
        "hash"
    }

    fn label(&self) -> &'static str {
        "One-way hash"
    }

    fn deterministic(&self) -> bool {
        true
    }

    fn anonymize(&self, input: &str, _context: &FieldContext<'_>) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(input.as_bytes());
        let result = hasher.finalize();
        Ok(format!("{result:x}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymize::tests::context;

    #[test]
    fn test_hash_is_deterministic() {
        let ctx = context();
        let first = HashAnonymizer.anonymize("a@b.com", &ctx).unwrap();
        let second = HashAnonymizer.anonymize("a@b.com", &ctx).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_hash_differs_per_input() {
        let ctx = context();
        let first = HashAnonymizer.anonymize("a@b.com", &ctx).unwrap();
        let second = HashAnonymizer.anonymize("b@b.com", &ctx).unwrap();
        assert_ne!(first, second);
    }
}
