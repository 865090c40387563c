//! PostgreSQL integration for the account directory.
//!
//! ## Connectivity
//!
//! - [`db()`] — Establishes a database connection from `DB_URL`
//!
//! ## Schema
//!
//! - [`Schema`] — Table metadata and DDL generation
//! - [`install()`] — Applies one relation's DDL and indices
//!
//! ## Table Names
//!
//! Constants for the persistent entities: roles, users, and the
//! `user_details` view joining the two.
mod schema;

pub use schema::*;

use std::sync::Arc;
use tokio_postgres::Client;

/// Establishes a database connection.
///
/// Connects to PostgreSQL using the `DB_URL` environment variable.
/// Returns an `Arc<Client>` suitable for sharing across async tasks.
/// The connection task is spawned onto the current runtime and logs
/// when the server drops it.
pub async fn db() -> anyhow::Result<Arc<Client>> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let ref url = std::env::var("DB_URL").map_err(|_| anyhow::anyhow!("DB_URL must be set"))?;
    let (client, connection) = tokio_postgres::connect(url, tls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("database connection closed: {}", e);
        }
    });
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await?;
    Ok(Arc::new(client))
}

/// PostgreSQL error type alias.
pub type PgErr = tokio_postgres::Error;

/// Table for roles and their dashboard routes.
#[rustfmt::skip]
pub const ROLES:        &str = "roles";
/// Table for registered user accounts (holds the credential column).
#[rustfmt::skip]
pub const USERS:        &str = "users";
/// View joining users with role name, code, and dashboard route.
#[rustfmt::skip]
pub const USER_DETAILS: &str = "user_details";

/// Unique constraint on `users.username`.
#[rustfmt::skip]
pub const USERS_USERNAME_KEY: &str = "users_username_key";
/// Unique constraint on `users.email`.
#[rustfmt::skip]
pub const USERS_EMAIL_KEY:    &str = "users_email_key";
/// Unique constraint on `roles.role_code`.
#[rustfmt::skip]
pub const ROLES_CODE_KEY:     &str = "roles_role_code_key";
/// Unique constraint on `roles.role_name`.
#[rustfmt::skip]
pub const ROLES_NAME_KEY:     &str = "roles_role_name_key";
