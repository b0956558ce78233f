//! Password hashing and verification.
//!
//! Stored format: `<hex salt>$<hex sha256(salt || password)>`. The salt is
//! 16 random bytes per password, so equal passwords hash differently.

use rand::Rng;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt: [u8; SALT_LEN] = rand::rng().random();
    format!("{}${}", hex::encode(salt), hex::encode(digest(&salt, password)))
}

/// Verifies a candidate password against a stored hash.
///
/// Returns `false` for malformed stored values instead of erroring, so a
/// corrupt row behaves like a wrong password.
pub fn verify_password(stored: &str, candidate: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };

    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };

    constant_time_eq(&digest(&salt, candidate), &expected)
}

fn digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

// Comparison time must not depend on where the first mismatch occurs.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter22");
        assert!(verify_password(&hash, "hunter22"));
        assert!(!verify_password(&hash, "hunter23"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = hash_password("swordfish1");
        let b = hash_password("swordfish1");
        assert_ne!(a, b);
        assert!(verify_password(&a, "swordfish1"));
        assert!(verify_password(&b, "swordfish1"));
    }

    #[test]
    fn test_malformed_stored_value() {
        assert!(!verify_password("", "anything"));
        assert!(!verify_password("no-separator", "anything"));
        assert!(!verify_password("zzzz$zzzz", "anything"));
    }
}
