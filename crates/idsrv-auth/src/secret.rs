//! Client secret generation and verification.
//!
//! Secrets are stored as Argon2id PHC strings and never in plaintext.
//!
//! # Example
//!
//! ```
//! use idsrv_auth::secret::{generate_client_secret, hash_secret, verify_secret};
//!
//! let secret = generate_client_secret();
//! let hash = hash_secret(&secret).unwrap();
//!
//! assert!(verify_secret(&secret, &hash).unwrap());
//! ```

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;

/// Generate a new cryptographically secure client secret.
///
/// The secret is a 256-bit random value encoded as hexadecimal with a
/// `cs_` prefix (67 characters total).
pub fn generate_client_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().r#gen();
    format!("cs_{}", hex::encode(bytes))
}

/// Hash a secret for storage using Argon2id with a random salt.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails (rare).
pub fn hash_secret(secret: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(secret.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a secret against a stored Argon2 hash.
///
/// Returns `Ok(false)` on mismatch. `Err` only if the stored hash is not a
/// valid PHC string.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if `hash` cannot be parsed.
pub fn verify_secret(secret: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    let result = Argon2::default().verify_password(secret.as_bytes(), &parsed_hash);
    Ok(result.is_ok())
}
