//! Password digests and bearer tokens
//!
//! Pure credential primitives plus the database-backed token secret. Password
//! storage is a salted SHA-256 digest (hash and salt live in separate users
//! columns); tokens are HS256 JWTs carrying the user guid, valid for 30 days.
//! The signing secret is generated once on first use and persisted in the
//! settings table so tokens survive restarts.

use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Bearer token validity window
pub const TOKEN_VALIDITY_DAYS: i64 = 30;

/// Settings-table key holding the token signing secret
const TOKEN_SECRET_KEY: &str = "token_secret";

// ========================================
// Password Digests
// ========================================

/// Generate a fresh random salt for a new user
pub fn generate_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Salted digest of a password: SHA-256 over `salt:password`, hex-encoded
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Verify a password attempt against the stored salt and digest
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}

// ========================================
// Bearer Tokens
// ========================================

/// JWT claims: subject is the user guid, expiry is Unix seconds
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Issue a bearer token for a user, valid for [`TOKEN_VALIDITY_DAYS`] from `now`
pub fn issue_token(user_guid: &str, secret: &str, now: DateTime<Utc>) -> Result<String> {
    let claims = Claims {
        sub: user_guid.to_string(),
        exp: (now + Duration::days(TOKEN_VALIDITY_DAYS)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Token encoding failed: {}", e)))
}

/// Verify a bearer token and return the user guid it names.
///
/// Any failure (malformed, bad signature, expired) yields `None`; callers
/// treat that as an anonymous request rather than an error.
pub fn verify_token(token: &str, secret: &str) -> Option<String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims.sub)
}

// ========================================
// Token Secret Management
// ========================================

/// Load the token signing secret from the settings table, generating and
/// persisting a fresh one on first run.
pub async fn load_token_secret(db: &SqlitePool) -> Result<String> {
    let existing: Option<String> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(TOKEN_SECRET_KEY)
            .fetch_optional(db)
            .await?;

    match existing {
        Some(secret) if !secret.is_empty() => Ok(secret),
        _ => initialize_token_secret(db).await,
    }
}

/// Generate a random 256-bit secret and store it in the settings table
async fn initialize_token_secret(db: &SqlitePool) -> Result<String> {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    let secret: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(TOKEN_SECRET_KEY)
        .bind(&secret)
        .execute(db)
        .await?;

    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[test]
    fn password_roundtrip() {
        let salt = generate_salt();
        let hash = hash_password("hunter2", &salt);

        assert!(verify_password("hunter2", &salt, &hash));
        assert!(!verify_password("hunter3", &salt, &hash));
    }

    #[test]
    fn same_password_different_salt_different_hash() {
        let hash_a = hash_password("hunter2", &generate_salt());
        let hash_b = hash_password("hunter2", &generate_salt());
        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn digest_is_hex_sha256() {
        let hash = hash_password("pw", "salt");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn token_roundtrip() {
        let token = issue_token("user-guid-1", "secret", Utc::now()).unwrap();
        assert_eq!(
            verify_token(&token, "secret").as_deref(),
            Some("user-guid-1")
        );
    }

    #[test]
    fn expired_token_rejected() {
        let issued = Utc::now() - Duration::days(TOKEN_VALIDITY_DAYS + 1);
        let token = issue_token("user-guid-1", "secret", issued).unwrap();
        assert_eq!(verify_token(&token, "secret"), None);
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = issue_token("user-guid-1", "secret", Utc::now()).unwrap();
        assert_eq!(verify_token(&token, "other-secret"), None);
    }

    #[test]
    fn garbage_token_rejected() {
        assert_eq!(verify_token("not-a-token", "secret"), None);
        assert_eq!(verify_token("", "secret"), None);
    }

    async fn settings_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(
            r#"
            CREATE TABLE settings (
                key TEXT PRIMARY KEY,
                value TEXT,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        pool
    }

    #[tokio::test]
    async fn token_secret_generated_once_and_stable() {
        let db = settings_pool().await;

        let first = load_token_secret(&db).await.unwrap();
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));

        let second = load_token_secret(&db).await.unwrap();
        assert_eq!(first, second);
    }
}
