use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use std::sync::OnceLock;

use crate::{CoreError, CoreResult};

/// Hashes a password with Argon2id and a random salt, returning the PHC string.
pub fn hash_password(password: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::Storage(format!("password hashing failed: {}", e)))
}

/// Checks `password` against a stored PHC string. A malformed hash never verifies.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is unreadable: {}", e);
            false
        }
    }
}

/// Stand-in hash verified for unknown emails, so they cost as much as a wrong password.
fn decoy_hash() -> &'static str {
    static DECOY: OnceLock<String> = OnceLock::new();
    DECOY.get_or_init(|| hash_password("decoy password").unwrap_or_default())
}

/// `hash_password` on the blocking pool.
pub async fn hash_password_blocking(password: &str) -> CoreResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| CoreError::Storage(format!("password hashing task failed: {}", e)))?
}

/// `verify_password` on the blocking pool. Without a stored hash the decoy is
/// checked instead and the result is always false.
pub async fn verify_password_blocking(password: &str, stored_hash: Option<&str>) -> CoreResult<bool> {
    let password = password.to_string();
    let stored = stored_hash.map(str::to_string);
    tokio::task::spawn_blocking(move || match stored {
        Some(hash) => verify_password(&password, &hash),
        None => {
            verify_password(&password, decoy_hash());
            false
        }
    })
    .await
    .map_err(|e| CoreError::Storage(format!("password verification task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();

        assert_ne!(hash, "correct horse");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "plaintext"));
    }

    #[test]
    fn test_decoy_is_a_real_hash() {
        assert!(decoy_hash().starts_with("$argon2"));
        assert!(PasswordHash::new(decoy_hash()).is_ok());
    }

    #[tokio::test]
    async fn test_blocking_helpers() {
        let hash = hash_password_blocking("correct horse").await.unwrap();
        assert!(verify_password_blocking("correct horse", Some(&hash)).await.unwrap());
        assert!(!verify_password_blocking("wrong horse", Some(&hash)).await.unwrap());

        // Even the decoy's own password is refused without a stored hash
        assert!(!verify_password_blocking("decoy password", None).await.unwrap());
    }
}
