use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{CredentialStore, NewUser, Organization, StoreError, StoreResult, User, UserInvitation};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Maps a unique-constraint violation to `Conflict(field)`.
fn conflict_on(field: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            debug!(field, "unique constraint violated");
            StoreError::Conflict(field)
        }
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn get_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, password, organization_id, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, password, organization_id, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, last_name, email, password, organization_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, first_name, last_name, email, password, organization_id, created_at
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.organization_id)
        .fetch_one(&self.db)
        .await
        .map_err(conflict_on("email"))?;
        Ok(user)
    }

    async fn delete_user_by_email(&self, email: &str) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            DELETE FROM users
            WHERE email = $1
            RETURNING id, first_name, last_name, email, password, organization_id, created_at
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound("user"))
    }

    async fn insert_organization(&self, name: &str, slug: &str) -> StoreResult<Organization> {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (name, slug)
            VALUES ($1, $2)
            RETURNING id, name, slug, created_at
            "#,
        )
        .bind(name)
        .bind(slug)
        .fetch_one(&self.db)
        .await?;
        Ok(org)
    }

    async fn get_organization_by_id(&self, id: Uuid) -> StoreResult<Option<Organization>> {
        let org = sqlx::query_as::<_, Organization>(
            r#"SELECT id, name, slug, created_at FROM organizations WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(org)
    }

    async fn create_user_invitation(
        &self,
        email: &str,
        from: Uuid,
    ) -> StoreResult<UserInvitation> {
        let invitation = sqlx::query_as::<_, UserInvitation>(
            r#"
            INSERT INTO user_invitations (email, user_id)
            VALUES ($1, $2)
            RETURNING id, email, user_id, created_at
            "#,
        )
        .bind(email)
        .bind(from)
        .fetch_one(&self.db)
        .await
        .map_err(conflict_on("email"))?;
        Ok(invitation)
    }

    async fn get_user_invitation_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Option<UserInvitation>> {
        let invitation = sqlx::query_as::<_, UserInvitation>(
            r#"SELECT id, email, user_id, created_at FROM user_invitations WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(invitation)
    }

    async fn get_invitations_for_account(&self, owner: Uuid) -> StoreResult<Vec<UserInvitation>> {
        let rows = sqlx::query_as::<_, UserInvitation>(
            r#"
            SELECT id, email, user_id, created_at
            FROM user_invitations
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn delete_user_invitation(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query(r#"DELETE FROM user_invitations WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
