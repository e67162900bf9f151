use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::{debug, warn};

use crate::{
    config::{AppConfig, Env},
    models::SessionState,
    profile::ProfileState,
};

/// Local-only header naming the member to impersonate.
pub const LOCAL_HANDLE_HEADER: &str = "x-user-handle";

/// Claims
///
/// Payload of the platform's bearer tokens. Only the handle is used to look the
/// member up; roles always come from the profile service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the member's user id.
    pub sub: String,
    pub handle: String,
    /// Expiration Time (exp): validated on every request.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// SessionUser
///
/// The session collaborator's view of the caller. Extraction never rejects: a
/// missing or invalid token is an anonymous session, and a profile lookup that
/// cannot complete leaves the session uninitialized so the gate answers
/// `pending` instead of redirecting.
#[derive(Debug, Clone)]
pub struct SessionUser(pub SessionState);

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
    ProfileState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let profiles = ProfileState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // 1. Local development bypass: trust a handle header outright.
        if config.env == Env::Local {
            if let Some(handle) = parts
                .headers
                .get(LOCAL_HANDLE_HEADER)
                .and_then(|value| value.to_str().ok())
            {
                return Ok(SessionUser(lookup_session(&profiles, &config, handle).await));
            }
        }

        // 2. Bearer token extraction. No token is a signed-out visitor.
        let Some(auth_header) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
        else {
            return Ok(SessionUser(SessionState::anonymous()));
        };

        let Some(token) = auth_header.strip_prefix("Bearer ") else {
            debug!("authorization header is not a bearer token");
            return Ok(SessionUser(SessionState::anonymous()));
        };

        // 3. Decode and validate.
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let claims = match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(kind = ?e.kind(), "rejected bearer token");
                return Ok(SessionUser(SessionState::anonymous()));
            }
        };

        // 4. Profile lookup.
        Ok(SessionUser(
            lookup_session(&profiles, &config, &claims.handle).await,
        ))
    }
}

/// lookup_session
///
/// Turns a profile lookup into a session snapshot, bounded by the configured
/// timeout.
pub async fn lookup_session(
    profiles: &ProfileState,
    config: &AppConfig,
    handle: &str,
) -> SessionState {
    match tokio::time::timeout(config.profile_timeout, profiles.get_profile(handle)).await {
        Ok(Ok(Some(profile))) => SessionState::signed_in(profile),
        Ok(Ok(None)) => {
            warn!(handle, "token names an unknown member");
            SessionState::anonymous()
        }
        Ok(Err(e)) => {
            warn!(handle, error = %e, "profile lookup failed, session left uninitialized");
            SessionState::uninitialized()
        }
        Err(_) => {
            warn!(
                handle,
                timeout_ms = config.profile_timeout.as_millis() as u64,
                "profile lookup timed out, session left uninitialized"
            );
            SessionState::uninitialized()
        }
    }
}
