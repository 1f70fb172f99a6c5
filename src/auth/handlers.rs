use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use tracing::instrument;

use super::{
    controllers,
    dto::{HomeResponse, InvitationsResponse, OrganizationResponse},
    extractors::{CurrentUser, MaybeUser, MaybeUserId},
};
use crate::{
    error::AppError,
    session::safe_redirect,
    state::AppState,
    store::StoreError,
    validation::FormInput,
};

pub const DEFAULT_LOGIN_REDIRECT: &str = "/dashboard";
pub const DEFAULT_REGISTER_REDIRECT: &str = "/register/invite-users";
pub const VIEW_INVITATION_PATH: &str = "/register/view-invitation";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page).post(register))
        .route("/register/invite-users", get(list_invitations).post(invite_user))
        .route("/register/view-invitation", get(view_invitation))
        .route("/logout", post(logout))
}

pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/dashboard", get(dashboard))
}

fn form_field<'a>(input: &'a FormInput, name: &str) -> Option<&'a str> {
    input.get(name).map(String::as_str)
}

/// GET /login
#[instrument(skip_all)]
pub async fn login_page(MaybeUserId(user_id): MaybeUserId) -> Response {
    match user_id {
        Some(_) => Redirect::to(DEFAULT_LOGIN_REDIRECT).into_response(),
        None => Json(serde_json::json!({})).into_response(),
    }
}

/// POST /login
#[instrument(skip(state, input))]
pub async fn login(
    State(state): State<AppState>,
    Form(input): Form<FormInput>,
) -> Result<Response, AppError> {
    let redirect_to = safe_redirect(form_field(&input, "redirectTo"), DEFAULT_LOGIN_REDIRECT);
    let remember = form_field(&input, "remember") == Some("on");

    let user = controllers::login(state.store.as_ref(), &input)
        .await?
        .into_result()?;

    Ok(state
        .sessions
        .create_user_session(user.id, remember, &redirect_to)?)
}

/// GET /register
#[instrument(skip_all)]
pub async fn register_page(MaybeUserId(user_id): MaybeUserId) -> Response {
    match user_id {
        Some(_) => Redirect::to("/").into_response(),
        None => Json(serde_json::json!({})).into_response(),
    }
}

/// POST /register
#[instrument(skip(state, input))]
pub async fn register(
    State(state): State<AppState>,
    Form(input): Form<FormInput>,
) -> Result<Response, AppError> {
    let redirect_to = safe_redirect(form_field(&input, "redirectTo"), DEFAULT_REGISTER_REDIRECT);

    let registration = controllers::register(state.store.as_ref(), &input)
        .await?
        .into_result()?;

    let target = match registration.joined {
        Some(_) => VIEW_INVITATION_PATH.to_string(),
        None => redirect_to,
    };
    Ok(state
        .sessions
        .create_user_session(registration.user.id, false, &target)?)
}

/// GET /register/invite-users
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_invitations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<InvitationsResponse>, AppError> {
    let invitations = controllers::list_invitations(state.store.as_ref(), user.id).await?;
    Ok(Json(InvitationsResponse { invitations }))
}

/// POST /register/invite-users
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn invite_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(input): Form<FormInput>,
) -> Result<Response, AppError> {
    let invitation = controllers::invite_user(state.store.as_ref(), user.id, &input)
        .await?
        .into_result()?;
    Ok((StatusCode::CREATED, Json(invitation)).into_response())
}

/// GET /register/view-invitation
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn view_invitation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<OrganizationResponse>, AppError> {
    let organization = state
        .store
        .get_organization_by_id(user.organization_id)
        .await?
        .ok_or(StoreError::NotFound("organization"))?;
    Ok(Json(OrganizationResponse { organization }))
}

/// POST /logout
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Response {
    state.sessions.logout()
}

/// GET /
#[instrument(skip_all)]
pub async fn home(MaybeUser(user): MaybeUser) -> Json<HomeResponse> {
    Json(HomeResponse {
        user: user.map(|u| u.into_public()),
    })
}

/// GET /dashboard
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn dashboard(CurrentUser(user): CurrentUser) -> Json<crate::store::PublicUser> {
    Json(user.into_public())
}
