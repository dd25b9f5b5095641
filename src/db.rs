// src/db.rs

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;

use crate::error::AppError;
use crate::utils::hash::hash_password;

/// Connection options shared by the server and the integration tests.
///
/// SQLite only enforces ON DELETE CASCADE when foreign keys are switched
/// on per connection, so every pool must be built from these options.
pub fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    Ok(options)
}

/// Creates the bootstrap admin account unless one already exists.
pub async fn seed_admin(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), AppError> {
    let user_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    if user_exists.is_some() {
        return Ok(());
    }

    tracing::info!("Seeding admin user: {}", username);
    let hashed_password = hash_password(password)?;

    sqlx::query("INSERT INTO users (username, email, password, role) VALUES (?, ?, ?, 'admin')")
        .bind(username)
        .bind(email)
        .bind(hashed_password)
        .execute(pool)
        .await?;
    tracing::info!("Admin user created successfully.");

    Ok(())
}
