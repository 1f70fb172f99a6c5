use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CredentialStore, NewUser, Organization, StoreError, StoreResult, User, UserInvitation};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    organizations: HashMap<Uuid, Organization>,
    invitations: Vec<UserInvitation>,
}

/// In-process store with the same uniqueness rules as the database schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email"));
        }
        let record = User {
            id: Uuid::new_v4(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password: Some(user.password),
            organization_id: user.organization_id,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete_user_by_email(&self, email: &str) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let id = tables
            .users
            .values()
            .find(|u| u.email == email)
            .map(|u| u.id)
            .ok_or(StoreError::NotFound("user"))?;
        tables.invitations.retain(|i| i.user_id != id);
        tables.users.remove(&id).ok_or(StoreError::NotFound("user"))
    }

    async fn insert_organization(&self, name: &str, slug: &str) -> StoreResult<Organization> {
        let org = Organization {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables
            .write()
            .await
            .organizations
            .insert(org.id, org.clone());
        Ok(org)
    }

    async fn get_organization_by_id(&self, id: Uuid) -> StoreResult<Option<Organization>> {
        Ok(self.tables.read().await.organizations.get(&id).cloned())
    }

    async fn create_user_invitation(
        &self,
        email: &str,
        from: Uuid,
    ) -> StoreResult<UserInvitation> {
        let mut tables = self.tables.write().await;
        if tables.invitations.iter().any(|i| i.email == email) {
            return Err(StoreError::Conflict("email"));
        }
        if !tables.users.contains_key(&from) {
            return Err(StoreError::NotFound("user"));
        }
        let invitation = UserInvitation {
            id: Uuid::new_v4(),
            email: email.to_string(),
            user_id: from,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.invitations.push(invitation.clone());
        Ok(invitation)
    }

    async fn get_user_invitation_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Option<UserInvitation>> {
        let tables = self.tables.read().await;
        Ok(tables.invitations.iter().find(|i| i.email == email).cloned())
    }

    async fn get_invitations_for_account(&self, owner: Uuid) -> StoreResult<Vec<UserInvitation>> {
        let tables = self.tables.read().await;
        Ok(tables
            .invitations
            .iter()
            .filter(|i| i.user_id == owner)
            .cloned()
            .collect())
    }

    async fn delete_user_invitation(&self, id: Uuid) -> StoreResult<()> {
        self.tables.write().await.invitations.retain(|i| i.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, org: Uuid) -> NewUser {
        NewUser {
            first_name: "Rumpel".into(),
            last_name: "Stiltskin".into(),
            email: email.into(),
            password: "$argon2id$fake".into(),
            organization_id: org,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        let org = store.insert_organization("Org", "org").await.unwrap();
        store.insert_user(new_user("a@b.com", org.id)).await.unwrap();
        let err = store.insert_user(new_user("a@b.com", org.id)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict("email")));
    }

    #[tokio::test]
    async fn emails_are_case_sensitive() {
        let store = MemoryStore::new();
        let org = store.insert_organization("Org", "org").await.unwrap();
        store.insert_user(new_user("a@b.com", org.id)).await.unwrap();
        assert!(store.get_user_by_email("A@b.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invitations_are_unique_per_email_and_listed_by_owner() {
        let store = MemoryStore::new();
        let org = store.insert_organization("Org", "org").await.unwrap();
        let owner = store.insert_user(new_user("owner@b.com", org.id)).await.unwrap();
        let other = store.insert_user(new_user("other@b.com", org.id)).await.unwrap();

        store.create_user_invitation("x@y.com", owner.id).await.unwrap();
        store.create_user_invitation("z@y.com", other.id).await.unwrap();
        let err = store
            .create_user_invitation("x@y.com", other.id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict("email")));

        let mine = store.get_invitations_for_account(owner.id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].email, "x@y.com");
    }

    #[tokio::test]
    async fn deleting_a_user_cascades_to_their_invitations() {
        let store = MemoryStore::new();
        let org = store.insert_organization("Org", "org").await.unwrap();
        let owner = store.insert_user(new_user("owner@b.com", org.id)).await.unwrap();
        store.create_user_invitation("x@y.com", owner.id).await.unwrap();

        let deleted = store.delete_user_by_email("owner@b.com").await.unwrap();
        assert_eq!(deleted.id, owner.id);
        assert!(store.get_user_invitation_by_email("x@y.com").await.unwrap().is_none());
        assert!(matches!(
            store.delete_user_by_email("owner@b.com").await,
            Err(StoreError::NotFound("user"))
        ));
    }
}
