//! Login, registration and invitation flows.
//!
//! Each flow validates the raw form, then runs its business checks in a
//! fixed order; the first failure is returned as a field error. Store
//! failures other than uniqueness conflicts propagate as `Err`.

use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{InvitationForm, LoginForm, RegisterForm, Registration};
use crate::store::{
    create_user, verify_login, CredentialStore, Organization, PublicUser, StoreError,
    StoreResult, UserInvitation,
};
use crate::validation::{validate, FormInput, FormResult};

pub const MSG_INVALID_LOGIN: &str = "Invalid email or password";
pub const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match";
pub const MSG_USER_EXISTS: &str = "A user with this email already exists";
pub const MSG_INVITATION_EXISTS: &str = "An invitation for this email already exists";

/// Unwraps a successful form result or returns its errors from the caller.
macro_rules! form_try {
    ($result:expr) => {
        match $result {
            FormResult::Success { data } => data,
            FormResult::Error { error } => return Ok(FormResult::Error { error }),
        }
    };
}

pub async fn login(
    store: &dyn CredentialStore,
    input: &FormInput,
) -> StoreResult<FormResult<PublicUser>> {
    let form = form_try!(validate::<LoginForm>(input));

    match verify_login(store, &form.email, &form.password).await? {
        Some(user) => {
            info!(user_id = %user.id, "user logged in");
            Ok(FormResult::Success { data: user })
        }
        None => {
            warn!(email = %form.email, "login rejected");
            Ok(FormResult::fail("email", MSG_INVALID_LOGIN))
        }
    }
}

pub async fn validate_register_form(
    store: &dyn CredentialStore,
    input: &FormInput,
) -> StoreResult<FormResult<RegisterForm>> {
    let form = form_try!(validate::<RegisterForm>(input));

    if form.password != form.confirm_password {
        return Ok(FormResult::fail("password", MSG_PASSWORD_MISMATCH));
    }

    if store.get_user_by_email(&form.email).await?.is_some() {
        warn!(email = %form.email, "email already registered");
        return Ok(FormResult::fail("email", MSG_USER_EXISTS));
    }

    Ok(FormResult::Success { data: form })
}

/// Registers a new user. A pending invitation for the email puts the user in
/// the inviter's organization and is then removed; otherwise the user gets a
/// fresh organization of their own.
pub async fn register(
    store: &dyn CredentialStore,
    input: &FormInput,
) -> StoreResult<FormResult<Registration>> {
    let form = form_try!(validate_register_form(store, input).await?);

    let invitation = store.get_user_invitation_by_email(&form.email).await?;
    let joined = match &invitation {
        Some(invitation) => inviter_organization(store, invitation).await?,
        None => None,
    };

    let user = match create_user(store, form.into(), joined.as_ref()).await {
        Ok(user) => user,
        Err(StoreError::Conflict(_)) => return Ok(FormResult::fail("email", MSG_USER_EXISTS)),
        Err(e) => return Err(e),
    };

    if let Some(invitation) = invitation {
        store.delete_user_invitation(invitation.id).await?;
    }

    info!(
        user_id = %user.id,
        organization_id = %user.organization_id,
        invited = joined.is_some(),
        "user registered"
    );
    Ok(FormResult::Success {
        data: Registration {
            user: user.into_public(),
            joined,
        },
    })
}

async fn inviter_organization(
    store: &dyn CredentialStore,
    invitation: &UserInvitation,
) -> StoreResult<Option<Organization>> {
    let Some(inviter) = store.get_user_by_id(invitation.user_id).await? else {
        warn!(invitation_id = %invitation.id, "inviting user no longer exists");
        return Ok(None);
    };
    let org = store.get_organization_by_id(inviter.organization_id).await?;
    if org.is_none() {
        warn!(invitation_id = %invitation.id, "inviting user's organization is missing");
    }
    Ok(org)
}

pub async fn validate_invitation_form(
    store: &dyn CredentialStore,
    input: &FormInput,
) -> StoreResult<FormResult<InvitationForm>> {
    let form = form_try!(validate::<InvitationForm>(input));

    if store.get_user_by_email(&form.email).await?.is_some() {
        return Ok(FormResult::fail("email", MSG_USER_EXISTS));
    }

    if store
        .get_user_invitation_by_email(&form.email)
        .await?
        .is_some()
    {
        return Ok(FormResult::fail("email", MSG_INVITATION_EXISTS));
    }

    Ok(FormResult::Success { data: form })
}

/// Creates an invitation from `inviter`, who must be an authenticated user.
pub async fn invite_user(
    store: &dyn CredentialStore,
    inviter: Uuid,
    input: &FormInput,
) -> StoreResult<FormResult<UserInvitation>> {
    let form = form_try!(validate_invitation_form(store, input).await?);

    match store.create_user_invitation(&form.email, inviter).await {
        Ok(invitation) => {
            info!(invitation_id = %invitation.id, %inviter, "user invited");
            Ok(FormResult::Success { data: invitation })
        }
        Err(StoreError::Conflict(_)) => Ok(FormResult::fail("email", MSG_INVITATION_EXISTS)),
        Err(e) => Err(e),
    }
}

/// Invitations created by `user_id`.
pub async fn list_invitations(
    store: &dyn CredentialStore,
    user_id: Uuid,
) -> StoreResult<Vec<UserInvitation>> {
    store.get_invitations_for_account(user_id).await
}
