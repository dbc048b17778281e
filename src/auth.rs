use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::Role,
    repository::RepositoryState,
    routing::is_admin_override,
};

/// Audience Supabase stamps on user access tokens.
pub const SUPABASE_AUDIENCE: &str = "authenticated";

/// Claims
///
/// Payload of a Supabase access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the auth user id, also the primary key of `public.profiles`.
    pub sub: Uuid,
    /// The email the user signed in with.
    #[serde(default)]
    pub email: String,
    /// Audience (aud): always "authenticated" for user sessions.
    pub aud: String,
    /// Expiration Time (exp).
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// Session
///
/// Evidence of an authenticated user, resolved from the request. `access_token` is
/// kept so a forced sign-out can revoke it; the local bypass has none.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub access_token: Option<String>,
}

/// Why a presented session could not be read. An absent session is not an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("authorization header is not a bearer token")]
    MalformedHeader,
    #[error("session token rejected: {0}")]
    InvalidToken(String),
}

/// resolve_session
///
/// The session resolver:
/// 1. Local bypass: in `Env::Local` an `x-user-id` header (plus optional
///    `x-user-email`) stands in for a token.
/// 2. No `Authorization` header, or an expired token: no session.
/// 3. Anything else that fails to validate is a `SessionError`.
pub fn resolve_session(
    headers: &HeaderMap,
    config: &AppConfig,
) -> Result<Option<Session>, SessionError> {
    if config.env == Env::Local {
        let bypass_id = headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok());

        if let Some(user_id) = bypass_id {
            let email = headers
                .get("x-user-email")
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            return Ok(Some(Session {
                user_id,
                email,
                access_token: None,
            }));
        }
    }

    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let token = auth_header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(SessionError::MalformedHeader)?;

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.set_audience(&[SUPABASE_AUDIENCE]);

    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Ok(Some(Session {
            user_id: data.claims.sub,
            email: data.claims.email,
            access_token: Some(token.to_string()),
        })),
        // An expired session is simply no longer a session.
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Ok(None),
        Err(e) => Err(SessionError::InvalidToken(e.to_string())),
    }
}

/// MaybeSession
///
/// Extractor for routes that decide what to do with anonymous callers themselves
/// (the landing redirect). Never rejects; carries the resolver's verdict.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Result<Option<Session>, SessionError>);

impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        Ok(MaybeSession(resolve_session(&parts.headers, &config)))
    }
}

/// AuthUser
///
/// Resolved identity of an authenticated request: a valid session backed by an
/// existing, unblocked profile (or the configured override email).
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    /// Raw role text from the profile.
    pub role: String,
    pub club_id: Option<Uuid>,
}

impl AuthUser {
    pub fn role_kind(&self) -> Option<Role> {
        self.role.parse().ok()
    }

    /// Backoffice gate.
    pub fn require_super_admin(&self) -> Result<(), AppError> {
        match self.role_kind() {
            Some(Role::SuperAdmin) => Ok(()),
            _ => Err(AppError::Forbidden),
        }
    }

    /// Club-scoped routes need a club; users still onboarding have none.
    pub fn require_club(&self) -> Result<Uuid, AppError> {
        self.club_id.ok_or(AppError::Forbidden)
    }
}

/// AuthUser Extractor Implementation
///
/// 0. Already resolved by `auth_middleware` for this request: reused as is.
/// 1. Session resolution (bypass header or bearer JWT).
/// 2. Override email: granted the super-admin identity without a profile lookup,
///    matching the landing decision.
/// 3. Profile lookup: missing profile is 401, blocked is 403, store failure is 500.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let session = match resolve_session(&parts.headers, &config) {
            Ok(Some(session)) => session,
            Ok(None) => return Err(AppError::Unauthorized),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected session");
                return Err(AppError::Unauthorized);
            }
        };

        if is_admin_override(&session.email, config.admin_override_email.as_deref()) {
            return Ok(AuthUser {
                id: session.user_id,
                email: session.email,
                role: Role::SuperAdmin.as_str().to_string(),
                club_id: None,
            });
        }

        let profile = repo
            .get_profile(session.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if profile.is_blocked {
            tracing::info!(user_id = %profile.id, "Blocked account refused");
            return Err(AppError::AccountBlocked);
        }

        Ok(AuthUser {
            id: profile.id,
            email: profile.email,
            role: profile.role,
            club_id: profile.club_id,
        })
    }
}
