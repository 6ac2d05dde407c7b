//! Share token generation.

use rand::RngExt;
use rand::distr::Alphanumeric;

/// Generates a random URL-safe share token.
///
/// `Alphanumeric` draws from a 62-symbol alphabet, so the default
/// 24-character token carries roughly 143 bits of entropy.
pub fn generate(length: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = generate(24);
        assert_eq!(token.len(), 24);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_tokens_are_distinct() {
        assert_ne!(generate(24), generate(24));
    }
}
