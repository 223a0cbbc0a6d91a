/// Credential digests
///
/// Passwords are stored as hex-encoded SHA-256 digests of the plaintext.
/// The digest is deterministic on purpose: login resolves principals with
/// a single `(email, password_digest)` equality lookup, so the same input
/// must always produce the same stored value.
///
/// This is a weaker property than per-record salted hashing (the digest
/// doubles as a lookup key); changing it would change the login lookup
/// contract, so any upgrade has to migrate both together.
///
/// # Example
///
/// ```
/// use kadro_shared::auth::credentials::{digest_password, verify_password};
///
/// let digest = digest_password("super_secret_123");
/// assert!(verify_password("super_secret_123", &digest));
/// assert!(!verify_password("wrong_password", &digest));
/// ```

use sha2::{Digest, Sha256};

/// Computes the stored digest for a plaintext password
///
/// Deterministic and one-way: same input, same output.
pub fn digest_password(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verifies a candidate password against a stored digest
///
/// Re-hashes the candidate and compares for equality, matching the
/// storage-side join the login lookup performs.
pub fn verify_password(candidate: &str, stored_digest: &str) -> bool {
    digest_password(candidate) == stored_digest
}

/// Validates minimum password requirements
///
/// # Errors
///
/// Returns a human-readable message describing the first unmet requirement.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if !password.chars().any(|c| c.is_alphabetic()) {
        return Err("Password must contain at least one letter".to_string());
    }

    if !password.chars().any(|c| c.is_numeric()) {
        return Err("Password must contain at least one digit".to_string());
    }

    Ok(())
}
