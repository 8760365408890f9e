//! Bearer-token authentication
//!
//! Extractors that resolve the `Authorization: Bearer <token>` header
//! against the session store. Handlers take [`AuthUser`] for any signed-in
//! account or [`AdminUser`] where the endpoint is admin-only.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::store::User;

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// The authenticated caller, verified to be an admin
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

/// Like [`AuthUser`] but absent instead of failing when no token is sent.
/// Used by registration, which is open but behaves differently for admins.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<User>);

/// Pull the bearer token out of the Authorization header
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

fn resolve(state: &AppState, parts: &Parts) -> Result<Option<User>, ApiError> {
    let token = match bearer_token(parts) {
        Some(token) if !token.is_empty() => token,
        _ => return Ok(None),
    };

    Ok(state.store.resolve_session(token)?)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match resolve(state, parts)? {
            Some(user) => Ok(AuthUser(user)),
            None => Err(ApiError::Unauthorized(
                "Missing or invalid bearer token".to_string(),
            )),
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::Forbidden(
                "Admin privileges required".to_string(),
            ));
        }
        Ok(AdminUser(user))
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(resolve(state, parts)?))
    }
}
