//! User Routes
//!
//! Account registration, login and management.
//!
//! - POST /api/v1/users/register - Create an account, returns a token
//! - POST /api/v1/users/login - Exchange credentials for a token
//! - POST /api/v1/users/logout - Invalidate the presented token
//! - GET /api/v1/users - List accounts (admin)
//! - GET /api/v1/users/:id - Get one account (self or admin)
//! - PUT /api/v1/users/:id - Update an account (self or admin)
//! - DELETE /api/v1/users/:id - Delete an account and its projects (admin)

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::api::auth::{AdminUser, AuthUser, MaybeAuthUser};
use crate::api::dto::{
    AuthResponse, LoginRequest, RegisterRequest, UpdateUserRequest, UserResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::store::users::{NewUser, UserUpdate};
use crate::store::Role;

/// POST /api/v1/users/register
///
/// Open registration. Creating an admin account requires an admin caller,
/// except when no users exist yet (first-boot bootstrap).
pub async fn register(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    validate_register_request(&req)?;

    let role = parse_role(req.role.as_deref())?;

    if role == Role::Admin {
        let caller_is_admin = caller.as_ref().map(|u| u.is_admin()).unwrap_or(false);
        let bootstrapping = state.store.count_users()? == 0;
        if !caller_is_admin && !bootstrapping {
            return Err(ApiError::Forbidden(
                "Only admins can create admin accounts".to_string(),
            ));
        }
    }

    let user = state.store.create_user(NewUser {
        name: req.name.trim().to_string(),
        email: req.email.trim().to_lowercase(),
        password: req.password,
        role,
    })?;

    let token = state
        .store
        .create_session(user.id, state.config.token_ttl_hours)?;

    tracing::info!(user_id = user.id, email = %user.email, role = %user.role, "Registered user");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserResponse::from(&user),
        }),
    ))
}

/// POST /api/v1/users/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = req.email.trim().to_lowercase();

    let user = state
        .store
        .authenticate(&email, &req.password)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let token = state
        .store
        .create_session(user.id, state.config.token_ttl_hours)?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}

/// POST /api/v1/users/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        state.store.delete_session(token.trim())?;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state.store.list_users()?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// GET /api/v1/users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    if caller.id != id && !caller.is_admin() {
        return Err(ApiError::Forbidden(
            "Cannot view another user's account".to_string(),
        ));
    }

    let user = state.store.get_user(id)?;
    Ok(Json(UserResponse::from(&user)))
}

/// PUT /api/v1/users/:id
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    if caller.id != id && !caller.is_admin() {
        return Err(ApiError::Forbidden(
            "Cannot update another user's account".to_string(),
        ));
    }

    let role = match req.role.as_deref() {
        Some(role) => {
            // Role changes stay an admin operation even on your own account
            if !caller.is_admin() {
                return Err(ApiError::Forbidden(
                    "Only admins can change roles".to_string(),
                ));
            }
            Some(parse_role(Some(role))?)
        }
        None => None,
    };

    if let Some(name) = &req.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("Name cannot be empty".to_string()));
        }
    }
    if let Some(email) = &req.email {
        validate_email(email)?;
    }
    if let Some(password) = &req.password {
        validate_password(password)?;
    }

    let user = state.store.update_user(
        id,
        UserUpdate {
            name: req.name.map(|n| n.trim().to_string()),
            email: req.email.map(|e| e.trim().to_lowercase()),
            password: req.password,
            role,
        },
    )?;

    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /api/v1/users/:id
///
/// Deletes the account together with its projects and their images.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if admin.id == id {
        return Err(ApiError::Validation(
            "Admins cannot delete their own account".to_string(),
        ));
    }

    state.store.delete_user(id)?;

    tracing::info!(user_id = id, "Deleted user");

    Ok(StatusCode::NO_CONTENT)
}

/// Validate a registration request
fn validate_register_request(req: &RegisterRequest) -> ApiResult<()> {
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Name cannot be empty".to_string()));
    }
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    Ok(())
}

fn validate_email(email: &str) -> ApiResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ApiError::Validation("Email cannot be empty".to_string()));
    }
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(ApiError::Validation(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    Ok(())
}

fn validate_password(password: &str) -> ApiResult<()> {
    if password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

/// Parse an optional role string, defaulting to client
fn parse_role(role: Option<&str>) -> ApiResult<Role> {
    match role {
        None => Ok(Role::Client),
        Some(s) => Role::parse(s).ok_or_else(|| {
            ApiError::Validation(format!("Invalid role: {}. Use client or admin", s))
        }),
    }
}
