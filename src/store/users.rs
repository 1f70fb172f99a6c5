use tracing::{debug, warn};

use super::organizations::{create_organization, family_name};
use super::{CredentialStore, NewUser, Organization, PublicUser, StoreError, StoreResult, User};
use crate::auth::password::{hash_password, verify_password};

/// Plaintext registration fields.
#[derive(Debug, Clone)]
pub struct UserFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Hashes the password and inserts the user. Without an `organization` a new
/// "<first> <last>'s Family" organization is created for them first.
pub async fn create_user(
    store: &dyn CredentialStore,
    fields: UserFields,
    organization: Option<&Organization>,
) -> StoreResult<User> {
    let password = hash_password(&fields.password).map_err(|e| StoreError::Hash(e.to_string()))?;

    let organization_id = match organization {
        Some(org) => org.id,
        None => {
            let name = family_name(&fields.first_name, &fields.last_name);
            create_organization(store, &name).await?.id
        }
    };

    debug!(email = %fields.email, %organization_id, "inserting user");
    store
        .insert_user(NewUser {
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            password,
            organization_id,
        })
        .await
}

/// Returns the user without their password when `password` matches the
/// stored hash. Unknown users, users without a password and unreadable
/// hashes all yield `None`.
pub async fn verify_login(
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
) -> StoreResult<Option<PublicUser>> {
    let Some(user) = store.get_user_by_email(email).await? else {
        return Ok(None);
    };

    let hash = match user.password.as_deref() {
        Some(hash) if !hash.is_empty() => hash,
        _ => return Ok(None),
    };

    match verify_password(password, hash) {
        Ok(true) => Ok(Some(user.into_public())),
        Ok(false) => Ok(None),
        Err(e) => {
            warn!(error = %e, user_id = %user.id, "stored password hash unreadable");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::store::MemoryStore;

    fn rumpel() -> UserFields {
        UserFields {
            first_name: "Rumpel".into(),
            last_name: "Stiltskin".into(),
            email: "rumpel@example.com".into(),
            password: "1234asdf".into(),
        }
    }

    #[tokio::test]
    async fn create_user_makes_a_family_organization() {
        let store = MemoryStore::new();
        let user = create_user(&store, rumpel(), None).await.unwrap();

        let org = store
            .get_organization_by_id(user.organization_id)
            .await
            .unwrap()
            .expect("organization created");
        assert_eq!(org.name, "Rumpel Stiltskin's Family");
        assert_eq!(org.slug, "rumpel-stiltskins-family");
    }

    #[tokio::test]
    async fn create_user_attaches_to_given_organization() {
        let store = MemoryStore::new();
        let org = create_organization(&store, "Shared").await.unwrap();
        let user = create_user(&store, rumpel(), Some(&org)).await.unwrap();
        assert_eq!(user.organization_id, org.id);
    }

    #[tokio::test]
    async fn stored_password_is_hashed_and_verifies() {
        let store = MemoryStore::new();
        let user = create_user(&store, rumpel(), None).await.unwrap();
        let stored = user.password.clone().unwrap();
        assert_ne!(stored, "1234asdf");
        assert!(stored.starts_with("$argon2"));

        let verified = verify_login(&store, "rumpel@example.com", "1234asdf")
            .await
            .unwrap()
            .expect("login should verify");
        assert_eq!(verified.id, user.id);
        assert!(!serde_json::to_string(&verified).unwrap().contains("argon2"));
    }

    #[tokio::test]
    async fn verify_login_rejects_wrong_password_and_unknown_email() {
        let store = MemoryStore::new();
        create_user(&store, rumpel(), None).await.unwrap();
        assert!(verify_login(&store, "rumpel@example.com", "nope-nope")
            .await
            .unwrap()
            .is_none());
        assert!(verify_login(&store, "nobody@example.com", "1234asdf")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn verify_login_rejects_users_without_usable_password() {
        let store = MemoryStore::new();
        let org = create_organization(&store, "Org").await.unwrap();
        store
            .insert_user(NewUser {
                first_name: "No".into(),
                last_name: "Password".into(),
                email: "empty@example.com".into(),
                password: String::new(),
                organization_id: org.id,
            })
            .await
            .unwrap();
        store
            .insert_user(NewUser {
                first_name: "Bad".into(),
                last_name: "Hash".into(),
                email: "bad@example.com".into(),
                password: "quux".into(),
                organization_id: org.id,
            })
            .await
            .unwrap();

        assert!(verify_login(&store, "empty@example.com", "")
            .await
            .unwrap()
            .is_none());
        assert!(verify_login(&store, "bad@example.com", "quux")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_email_surfaces_as_conflict() {
        let store = MemoryStore::new();
        create_user(&store, rumpel(), None).await.unwrap();
        let err = create_user(&store, rumpel(), Some(&Organization {
            id: Uuid::new_v4(),
            name: "x".into(),
            slug: "x".into(),
            created_at: time::OffsetDateTime::now_utc(),
        }))
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::Conflict("email")));
    }
}
