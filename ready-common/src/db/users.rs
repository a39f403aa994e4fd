//! User queries
//!
//! Credential columns (password_hash, password_salt) never leave this module
//! except through [`AuthRecord`], which the login flow consumes.

use crate::db::models::User;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Credential row used to verify a login attempt
#[derive(Debug, Clone)]
pub struct AuthRecord {
    pub guid: String,
    pub password_hash: String,
    pub password_salt: String,
}

/// Create a new user. Fails with [`Error::Conflict`] when the email is taken.
pub async fn create_user(
    db: &SqlitePool,
    email: &str,
    password_hash: &str,
    password_salt: &str,
    name: Option<&str>,
    organization: Option<&str>,
) -> Result<User> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
        .bind(email)
        .fetch_one(db)
        .await?;
    if exists {
        return Err(Error::Conflict("Email already registered".to_string()));
    }

    let guid = Uuid::new_v4().to_string();
    let created_at = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO users (guid, email, password_hash, password_salt, name, organization, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(email)
    .bind(password_hash)
    .bind(password_salt)
    .bind(name)
    .bind(organization)
    .bind(created_at)
    .execute(db)
    .await?;

    Ok(User {
        guid,
        email: email.to_string(),
        name: name.map(str::to_string),
        organization: organization.map(str::to_string),
        created_at,
        last_login: None,
    })
}

/// Look up login credentials by email
pub async fn find_credentials(db: &SqlitePool, email: &str) -> Result<Option<AuthRecord>> {
    let row = sqlx::query(
        "SELECT guid, password_hash, password_salt FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(db)
    .await?;

    Ok(row.map(|row| AuthRecord {
        guid: row.get("guid"),
        password_hash: row.get("password_hash"),
        password_salt: row.get("password_salt"),
    }))
}

/// Look up a user's public profile by guid
pub async fn find_by_guid(db: &SqlitePool, guid: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT guid, email, name, organization, created_at, last_login
        FROM users WHERE guid = ?
        "#,
    )
    .bind(guid)
    .fetch_optional(db)
    .await?;

    Ok(row.map(|row| user_from_row(&row)))
}

/// Record a successful login
pub async fn touch_last_login(db: &SqlitePool, guid: &str) -> Result<()> {
    sqlx::query("UPDATE users SET last_login = ? WHERE guid = ?")
        .bind(Utc::now())
        .bind(guid)
        .execute(db)
        .await?;
    Ok(())
}

fn user_from_row(row: &SqliteRow) -> User {
    User {
        guid: row.get("guid"),
        email: row.get("email"),
        name: row.get("name"),
        organization: row.get("organization"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        last_login: row.get::<Option<DateTime<Utc>>, _>("last_login"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::create_users_table;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_users_table(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn create_and_find_user() {
        let db = setup_test_db().await;

        let user = create_user(&db, "a@example.com", "hash", "salt", Some("Ada"), None)
            .await
            .unwrap();
        assert_eq!(user.email, "a@example.com");
        assert_eq!(user.name.as_deref(), Some("Ada"));
        assert!(user.last_login.is_none());

        let found = find_by_guid(&db, &user.guid).await.unwrap().unwrap();
        assert_eq!(found.email, "a@example.com");
        assert_eq!(found.guid, user.guid);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let db = setup_test_db().await;

        create_user(&db, "a@example.com", "hash", "salt", None, None)
            .await
            .unwrap();
        let err = create_user(&db, "a@example.com", "hash2", "salt2", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn credentials_lookup() {
        let db = setup_test_db().await;

        assert!(find_credentials(&db, "missing@example.com")
            .await
            .unwrap()
            .is_none());

        let user = create_user(&db, "a@example.com", "hash", "salt", None, None)
            .await
            .unwrap();
        let creds = find_credentials(&db, "a@example.com").await.unwrap().unwrap();
        assert_eq!(creds.guid, user.guid);
        assert_eq!(creds.password_hash, "hash");
        assert_eq!(creds.password_salt, "salt");
    }

    #[tokio::test]
    async fn last_login_updates() {
        let db = setup_test_db().await;

        let user = create_user(&db, "a@example.com", "hash", "salt", None, None)
            .await
            .unwrap();
        touch_last_login(&db, &user.guid).await.unwrap();

        let found = find_by_guid(&db, &user.guid).await.unwrap().unwrap();
        assert!(found.last_login.is_some());
    }
}
