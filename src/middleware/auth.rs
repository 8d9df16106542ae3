use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{Validation, decode};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::{
    config::{AppConfig, IdentityConfig},
    dto::auth::Claims,
    entity::{
        Users,
        users::{self, UserRole},
    },
    error::AppError,
    state::AppState,
};

pub const FALLBACK_UID_HEADER: &str = "x-user-uid";
pub const FALLBACK_EMAIL_HEADER: &str = "x-user-email";
pub const FALLBACK_NAME_HEADER: &str = "x-user-name";

/// Who the identity provider says the caller is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: UserRole,
}

impl AuthUser {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("User")
    }
}

pub fn ensure_role(user: &AuthUser, role: UserRole) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, UserRole::Admin)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = resolve_identity(&parts.headers, &state.config.identity)?;
        let role = resolve_role(state, &identity).await?;

        Ok(AuthUser {
            uid: identity.uid,
            email: identity.email,
            name: identity.name,
            role,
        })
    }
}

/// Verifies the bearer token; in preview mode falls back to caller-supplied
/// identity headers when verification is impossible.
pub fn resolve_identity(
    headers: &HeaderMap,
    config: &IdentityConfig,
) -> Result<Identity, AppError> {
    let token = bearer_token(headers)?;

    let verify_err = match verify_token(token, config) {
        Ok(claims) => {
            return Ok(Identity {
                uid: claims.sub,
                email: claims.email,
                name: claims.name,
            });
        }
        Err(err) => err,
    };

    if config.allow_header_fallback {
        if let Some(identity) = identity_from_headers(headers) {
            tracing::warn!(
                uid = %identity.uid,
                reason = %verify_err,
                "token not verified, using identity headers"
            );
            return Ok(identity);
        }
    }

    Err(verify_err)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;

    Ok(token)
}

pub fn verify_token(token: &str, config: &IdentityConfig) -> Result<Claims, AppError> {
    let key = config
        .key
        .as_ref()
        .ok_or_else(|| AppError::Unauthorized("Token verification unavailable".into()))?;

    let mut validation = Validation::new(key.algorithm);
    match &config.audience {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }
    if let Some(iss) = &config.issuer {
        validation.set_issuer(&[iss]);
    }

    let decoded = decode::<Claims>(token, &key.decoding, &validation)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    if decoded.claims.sub.is_empty() {
        return Err(AppError::Unauthorized("Token has no subject".into()));
    }

    Ok(decoded.claims)
}

fn identity_from_headers(headers: &HeaderMap) -> Option<Identity> {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    Some(Identity {
        uid: read(FALLBACK_UID_HEADER)?,
        email: Some(read(FALLBACK_EMAIL_HEADER)?),
        name: read(FALLBACK_NAME_HEADER),
    })
}

/// Persisted role wins; an unsynced identity is admin only via the allow-list.
async fn resolve_role(state: &AppState, identity: &Identity) -> Result<UserRole, AppError> {
    let stored = Users::find()
        .filter(users::Column::Uid.eq(identity.uid.as_str()))
        .one(&state.orm)
        .await?;

    Ok(match stored {
        Some(user) => user.role,
        None => role_for_unsynced(&state.config, identity),
    })
}

fn role_for_unsynced(config: &AppConfig, identity: &Identity) -> UserRole {
    match identity.email.as_deref() {
        Some(email) if config.is_admin_email(email) => UserRole::Admin,
        _ => UserRole::User,
    }
}
