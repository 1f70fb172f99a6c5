//! Signed, client-held sessions.
//!
//! The session is an HS256 token in the `__session` cookie; its only
//! payload is the user id. Nothing is stored server-side.

use std::{ops::RangeInclusive, time::Duration};

use axum::{
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{SessionConfig, REMEMBER_DAYS_RANGE, TTL_MINUTES_RANGE};

pub mod cookie;

use cookie::{clear_session_cookie, read_cookie, session_cookie, SESSION_COOKIE};

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
    pub remember: bool,
}

#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub session_ttl: Duration,
    pub remember_ttl: Duration,
    pub secure: bool,
}

impl From<&SessionConfig> for SessionKeys {
    fn from(cfg: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            session_ttl: minutes(clamp_to(cfg.ttl_minutes, &TTL_MINUTES_RANGE)),
            remember_ttl: minutes(clamp_to(cfg.remember_days, &REMEMBER_DAYS_RANGE) * 24 * 60),
            secure: cfg.secure_cookie,
        }
    }
}

fn clamp_to(value: i64, range: &RangeInclusive<i64>) -> i64 {
    value.clamp(*range.start(), *range.end())
}

/// `n` is positive after clamping.
fn minutes(n: i64) -> Duration {
    Duration::from_secs(n as u64 * 60)
}

impl SessionKeys {
    fn ttl(&self, remember: bool) -> Duration {
        if remember {
            self.remember_ttl
        } else {
            self.session_ttl
        }
    }

    pub fn sign(&self, user_id: Uuid, remember: bool) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl(remember).as_secs() as i64);
        let claims = SessionClaims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            remember,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, remember, "session signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "session verified");
        Ok(data.claims)
    }

    /// Reads and verifies the session cookie. Absent, tampered or expired
    /// sessions all yield `None`.
    pub fn user_id(&self, headers: &HeaderMap) -> Option<Uuid> {
        let token = read_cookie(headers, SESSION_COOKIE)?;
        match self.verify(&token) {
            Ok(claims) => Some(claims.sub),
            Err(e) => {
                warn!(error = %e, "invalid session cookie");
                None
            }
        }
    }

    /// Sets a fresh session cookie and redirects to `redirect_to`.
    pub fn create_user_session(
        &self,
        user_id: Uuid,
        remember: bool,
        redirect_to: &str,
    ) -> anyhow::Result<Response> {
        let token = self.sign(user_id, remember)?;
        let max_age = remember.then(|| self.remember_ttl.as_secs() as i64);
        let mut headers = HeaderMap::new();
        headers.insert(header::SET_COOKIE, session_cookie(&token, max_age, self.secure)?);
        Ok((headers, Redirect::to(redirect_to)).into_response())
    }

    pub fn logout(&self) -> Response {
        logout_response(self.secure)
    }
}

/// Clears the session cookie and redirects home.
pub fn logout_response(secure: bool) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, clear_session_cookie(secure));
    (headers, Redirect::to("/")).into_response()
}

/// Accepts only same-origin relative paths; everything else becomes `default`.
pub fn safe_redirect(to: Option<&str>, default: &str) -> String {
    match to {
        Some(to) if to.starts_with('/') && !to.starts_with("//") && !to.starts_with("/\\") => {
            to.to_string()
        }
        _ => default.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> SessionConfig {
    SessionConfig {
        secret: "test-secret".into(),
        issuer: "test-issuer".into(),
        audience: "test-aud".into(),
        ttl_minutes: 5,
        remember_days: 7,
        secure_cookie: false,
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, StatusCode};

    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::from(&test_config())
    }

    fn cookie_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE}={token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn sign_and_verify_session() {
        let keys = keys();
        let user_id = Uuid::new_v4();
        let claims = keys.verify(&keys.sign(user_id, false).unwrap()).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "test-issuer");
        assert!(!claims.remember);
    }

    #[test]
    fn remember_extends_expiry() {
        let keys = keys();
        let short = keys.verify(&keys.sign(Uuid::new_v4(), false).unwrap()).unwrap();
        let long = keys.verify(&keys.sign(Uuid::new_v4(), true).unwrap()).unwrap();
        assert!(long.exp - long.iat >= 7 * 24 * 60 * 60);
        assert!(short.exp - short.iat <= 5 * 60);
    }

    #[test]
    fn rejects_token_signed_with_another_secret() {
        let mut other_cfg = test_config();
        other_cfg.secret = "another-secret".into();
        let forged = SessionKeys::from(&other_cfg).sign(Uuid::new_v4(), false).unwrap();
        assert!(keys().verify(&forged).is_err());
        assert_eq!(keys().user_id(&cookie_headers(&forged)), None);
    }

    #[test]
    fn user_id_reads_cookie() {
        let keys = keys();
        let user_id = Uuid::new_v4();
        let headers = cookie_headers(&keys.sign(user_id, false).unwrap());
        assert_eq!(keys.user_id(&headers), Some(user_id));
        assert_eq!(keys.user_id(&HeaderMap::new()), None);
        assert_eq!(keys.user_id(&cookie_headers("garbage")), None);
    }

    #[test]
    fn create_user_session_sets_cookie_and_redirects() {
        let res = keys()
            .create_user_session(Uuid::new_v4(), true, "/dashboard")
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/dashboard");
        let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=604800"));
    }

    #[test]
    fn logout_clears_cookie_and_goes_home() {
        let res = keys().logout();
        assert_eq!(res.headers()[header::LOCATION], "/");
        let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn oversized_lifetimes_are_clamped() {
        let mut cfg = test_config();
        cfg.ttl_minutes = i64::MAX;
        cfg.remember_days = i64::MAX / 2;
        let keys = SessionKeys::from(&cfg);
        assert_eq!(keys.remember_ttl, Duration::from_secs(3650 * 24 * 60 * 60));

        let claims = keys.verify(&keys.sign(Uuid::new_v4(), true).unwrap()).unwrap();
        assert!(claims.remember);
    }

    #[test]
    fn safe_redirect_only_allows_relative_paths() {
        assert_eq!(safe_redirect(Some("/budgets/1"), "/dashboard"), "/budgets/1");
        assert_eq!(
            safe_redirect(Some("https://evil.example.com"), "/dashboard"),
            "/dashboard"
        );
        assert_eq!(safe_redirect(Some("//evil.example.com"), "/dashboard"), "/dashboard");
        assert_eq!(safe_redirect(Some("/\\evil.example.com"), "/dashboard"), "/dashboard");
        assert_eq!(safe_redirect(Some(""), "/dashboard"), "/dashboard");
        assert_eq!(safe_redirect(None, "/dashboard"), "/dashboard");
    }
}
