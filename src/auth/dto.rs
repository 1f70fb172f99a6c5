use serde::Serialize;

use crate::store::{Organization, PublicUser, UserFields, UserInvitation};
use crate::validation::{
    FormSchema, Schema, ValidFields, INVITATION_SCHEMA, LOGIN_SCHEMA, REGISTER_SCHEMA,
};

/// Validated login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl FormSchema for LoginForm {
    fn schema() -> &'static Schema {
        &LOGIN_SCHEMA
    }

    fn from_fields(mut fields: ValidFields) -> Self {
        Self {
            email: fields.take("email"),
            password: fields.take("password"),
        }
    }
}

/// Validated registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl FormSchema for RegisterForm {
    fn schema() -> &'static Schema {
        &REGISTER_SCHEMA
    }

    fn from_fields(mut fields: ValidFields) -> Self {
        Self {
            first_name: fields.take("firstName"),
            last_name: fields.take("lastName"),
            email: fields.take("email"),
            password: fields.take("password"),
            confirm_password: fields.take("confirmPassword"),
        }
    }
}

impl From<RegisterForm> for UserFields {
    // confirm_password is not persisted
    fn from(form: RegisterForm) -> Self {
        UserFields {
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            password: form.password,
        }
    }
}

/// Validated invitation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationForm {
    pub email: String,
}

impl FormSchema for InvitationForm {
    fn schema() -> &'static Schema {
        &INVITATION_SCHEMA
    }

    fn from_fields(mut fields: ValidFields) -> Self {
        Self {
            email: fields.take("email"),
        }
    }
}

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: PublicUser,
    /// Set when the user joined an inviter's organization.
    pub joined: Option<Organization>,
}

#[derive(Debug, Serialize)]
pub struct InvitationsResponse {
    pub invitations: Vec<UserInvitation>,
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub user: Option<PublicUser>,
}

#[derive(Debug, Serialize)]
pub struct OrganizationResponse {
    pub organization: Organization,
}
