//! Removes a user (and their pending invitations) by email.
//!
//! Usage: `delete-user <email>`

use std::process::ExitCode;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use homebudget::store::{CredentialStore, PgStore, StoreError};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "homebudget=info".to_string()),
        )
        .init();

    let Some(email) = std::env::args().nth(1) else {
        eprintln!("usage: delete-user <email>");
        return Ok(ExitCode::from(2));
    };

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .context("connect to database")?;
    let store = PgStore::new(db);

    match store.delete_user_by_email(&email).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, %email, "user deleted");
            Ok(ExitCode::SUCCESS)
        }
        Err(StoreError::NotFound(_)) => {
            eprintln!("no user with email {email}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
