use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;
use uuid::Uuid;

use crate::{error::AppError, state::AppState, store::User};

/// Session user id, if any valid session cookie is present.
pub struct MaybeUserId(pub Option<Uuid>);

/// Session user id; redirects to login when absent.
pub struct UserId(pub Uuid);

/// The session's user record; redirects to login when there is no session
/// and logs out when the user no longer exists.
pub struct CurrentUser(pub User);

/// The session's user record, if any.
pub struct MaybeUser(pub Option<User>);

fn requested_path(parts: &Parts) -> String {
    parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".into())
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUserId {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUserId(state.sessions.user_id(&parts.headers)))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for UserId {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .sessions
            .user_id(&parts.headers)
            .map(UserId)
            .ok_or_else(|| AppError::Unauthorized {
                redirect_to: requested_path(parts),
            })
    }
}

/// Resolves a session user id, treating a dangling id as a stale session.
async fn load_user(state: &AppState, user_id: Uuid) -> Result<User, AppError> {
    match state.store.get_user_by_id(user_id).await? {
        Some(user) => Ok(user),
        None => {
            warn!(%user_id, "session user no longer exists");
            Err(AppError::StaleSession {
                secure: state.sessions.secure,
            })
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let UserId(user_id) = UserId::from_request_parts(parts, state).await?;
        load_user(state, user_id).await.map(CurrentUser)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUserId(user_id) = MaybeUserId::from_request_parts(parts, state)
            .await
            .unwrap_or(MaybeUserId(None));
        match user_id {
            Some(user_id) => load_user(state, user_id).await.map(|u| MaybeUser(Some(u))),
            None => Ok(MaybeUser(None)),
        }
    }
}
