use random_string::generate;
use sha2::{Digest, Sha512};

const SALT_CHARSET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SALT_LENGTH: usize = 16;

/// Hashes a plaintext password into the stored `salt$digest` form.
///
/// The digest is `hex(sha512("{salt}:{password}"))`; the salt is kept in
/// front of it so verification can recompute the same digest later.
#[must_use]
pub fn hash(password: &str) -> String {
    let salt = generate(SALT_LENGTH, SALT_CHARSET);
    let digest = digest_with_salt(&salt, password);
    format!("{salt}${digest}")
}

/// Checks a plaintext password against a stored `salt$digest` value.
///
/// A stored value that does not carry the expected shape never matches.
#[must_use]
pub fn verify(password: &str, stored: &str) -> bool {
    let Some((salt, expected)) = stored.split_once('$') else {
        return false;
    };
    let actual = digest_with_salt(salt, password);
    constant_time_eq(actual.as_bytes(), expected.as_bytes())
}

fn digest_with_salt(salt: &str, password: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

// Comparison over the full hex digest without short-circuiting on the
// first differing byte.
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
    fn verifies_its_own_output() {
        let stored = hash("hunter2!");
        assert!(verify("hunter2!", &stored));
        assert!(!verify("hunter3!", &stored));
    }

    #[test]
    fn salts_make_hashes_unique() {
        assert_ne!(hash("same password"), hash("same password"));
    }

    #[test]
    fn stored_value_keeps_the_salt_in_front() {
        let stored = hash("pw");
        let (salt, digest) = stored.split_once('$').unwrap();
        assert_eq!(salt.len(), SALT_LENGTH);
        assert_eq!(digest.len(), 128);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn malformed_stored_values_never_match() {
        assert!(!verify("pw", "no-dollar-sign-here"));
        assert!(!verify("pw", ""));
    }
}
