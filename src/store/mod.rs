//! Persistence primitives for users, organizations and invitations.
//!
//! [`CredentialStore`] is the seam between the auth flows and the database:
//! [`PgStore`] backs the running service, [`MemoryStore`] backs tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod models;
pub mod organizations;
pub mod postgres;
pub mod users;

pub use memory::MemoryStore;
pub use models::{NewUser, Organization, PublicUser, User, UserInvitation};
pub use organizations::create_organization;
pub use postgres::PgStore;
pub use users::{create_user, verify_login, UserFields};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write; carries the offending field.
    #[error("{0} already exists")]
    Conflict(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Fails with `Conflict("email")` when the email is taken.
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn delete_user_by_email(&self, email: &str) -> StoreResult<User>;

    async fn insert_organization(&self, name: &str, slug: &str) -> StoreResult<Organization>;
    async fn get_organization_by_id(&self, id: Uuid) -> StoreResult<Option<Organization>>;

    /// Fails with `Conflict("email")` when an invitation for the email exists.
    async fn create_user_invitation(&self, email: &str, from: Uuid)
        -> StoreResult<UserInvitation>;
    async fn get_user_invitation_by_email(&self, email: &str)
        -> StoreResult<Option<UserInvitation>>;
    async fn get_invitations_for_account(&self, owner: Uuid) -> StoreResult<Vec<UserInvitation>>;
    async fn delete_user_invitation(&self, id: Uuid) -> StoreResult<()>;
}
