use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::session::logout_response;
use crate::store::StoreError;
use crate::validation::FieldErrors;

#[derive(Debug, Error)]
pub enum AppError {
    /// Expected, user-correctable failure rendered as a field error map.
    #[error("form rejected")]
    Form(FieldErrors),

    /// No valid session on a route that needs one.
    #[error("authentication required")]
    Unauthorized { redirect_to: String },

    /// The session names a user that no longer exists.
    #[error("session refers to a missing user")]
    StaleSession { secure: bool },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Form(errors)
    }
}

pub fn login_redirect(redirect_to: &str) -> String {
    format!("/login?redirectTo={}", urlencoding::encode(redirect_to))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Form(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            AppError::Unauthorized { redirect_to } => {
                Redirect::to(&login_redirect(&redirect_to)).into_response()
            }
            AppError::StaleSession { secure } => logout_response(secure),
            AppError::Store(e) => {
                error!(error = %e, "store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::header;

    use super::*;
    use crate::validation::form_error;

    #[test]
    fn form_errors_are_bad_requests() {
        let res = AppError::from(form_error("email", "bad")).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_redirects_to_login_with_return_path() {
        let res = AppError::Unauthorized {
            redirect_to: "/register/invite-users".into(),
        }
        .into_response();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers()[header::LOCATION],
            "/login?redirectTo=%2Fregister%2Finvite-users"
        );
    }

    #[test]
    fn stale_session_logs_out() {
        let res = AppError::StaleSession { secure: false }.into_response();
        assert_eq!(res.headers()[header::LOCATION], "/");
        assert!(res.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .contains("Max-Age=0"));
    }

    #[test]
    fn infrastructure_failures_are_server_errors() {
        let res = AppError::from(StoreError::NotFound("user")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
