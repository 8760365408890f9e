//! Project Routes
//!
//! Project CRUD plus photo attachments. Clients operate on their own
//! projects; admins on all of them.
//!
//! - GET /api/v1/projects - List projects (own, or all for admins)
//! - POST /api/v1/projects - Create a project
//! - GET /api/v1/projects/:id - Get a project
//! - PUT /api/v1/projects/:id - Update a project
//! - DELETE /api/v1/projects/:id - Delete a project and its images
//! - POST /api/v1/projects/:id/images - Attach an image (max 5)
//! - DELETE /api/v1/projects/:id/images/:filename - Detach an image

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::auth::AuthUser;
use crate::api::dto::{
    CreateProjectRequest, ImagePayload, ProjectResponse, UpdateProjectRequest,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::store_image;
use crate::api::state::AppState;
use crate::store::projects::ProjectUpdate;
use crate::store::{Project, User};

/// A caller may touch a project they own; admins may touch any
fn check_access(user: &User, project: &Project) -> ApiResult<()> {
    if project.user_id != user.id && !user.is_admin() {
        return Err(ApiError::Forbidden(
            "Cannot access another user's project".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/v1/projects
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = if user.is_admin() {
        state.store.list_projects()?
    } else {
        state.store.list_projects_for_user(user.id)?
    };

    Ok(Json(projects.iter().map(ProjectResponse::from).collect()))
}

/// POST /api/v1/projects
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation(
            "Project name cannot be empty".to_string(),
        ));
    }

    let owner_id = match req.user_id {
        Some(owner_id) if owner_id != user.id => {
            if !user.is_admin() {
                return Err(ApiError::Forbidden(
                    "Only admins can create projects for other users".to_string(),
                ));
            }
            // Owner must exist
            state.store.get_user(owner_id)?;
            owner_id
        }
        _ => user.id,
    };

    let project = state.store.create_project(
        owner_id,
        req.name.trim(),
        req.description.as_deref(),
        req.note.as_deref(),
        req.duration.as_deref(),
    )?;

    tracing::info!(project_id = project.id, owner_id, "Created project");

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(&project))))
}

/// GET /api/v1/projects/:id
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state.store.get_project(id)?;
    check_access(&user, &project)?;
    Ok(Json(ProjectResponse::from(&project)))
}

/// PUT /api/v1/projects/:id
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state.store.get_project(id)?;
    check_access(&user, &project)?;

    if let Some(name) = &req.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation(
                "Project name cannot be empty".to_string(),
            ));
        }
    }

    let updated = state.store.update_project(
        id,
        ProjectUpdate {
            name: req.name.map(|n| n.trim().to_string()),
            description: req.description,
            note: req.note,
            duration: req.duration,
        },
    )?;

    Ok(Json(ProjectResponse::from(&updated)))
}

/// DELETE /api/v1/projects/:id
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let project = state.store.get_project(id)?;
    check_access(&user, &project)?;

    state.store.delete_project(id)?;

    tracing::info!(project_id = id, "Deleted project");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/:id/images
///
/// Attach a photo. The file is stored first and unlinked again when the
/// attach fails (for example on the 6th image), so a rejected upload
/// leaves nothing behind.
pub async fn add_image(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<ImagePayload>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    let project = state.store.get_project(id)?;
    check_access(&user, &project)?;

    let filename = store_image(&state, &payload)?;

    let updated = match state.store.add_project_image(id, &filename) {
        Ok(project) => project,
        Err(e) => {
            state.store.delete_upload(&filename);
            return Err(e.into());
        }
    };

    tracing::info!(
        project_id = id,
        images = updated.images.len(),
        "Attached project image"
    );

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(&updated))))
}

/// DELETE /api/v1/projects/:id/images/:filename
pub async fn remove_image(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path((id, filename)): Path<(i64, String)>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state.store.get_project(id)?;
    check_access(&user, &project)?;

    let updated = state.store.remove_project_image(id, &filename)?;
    Ok(Json(ProjectResponse::from(&updated)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Role;

    fn user(id: i64, role: Role) -> User {
        User {
            id,
            name: "U".to_string(),
            email: "u@example.com".to_string(),
            password_hash: String::new(),
            role,
            created_at: String::new(),
        }
    }

    fn project(owner: i64) -> Project {
        Project {
            id: 1,
            user_id: owner,
            name: "P".to_string(),
            description: None,
            note: None,
            duration: None,
            images: Vec::new(),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_owner_and_admin_access() {
        assert!(check_access(&user(1, Role::Client), &project(1)).is_ok());
        assert!(check_access(&user(2, Role::Client), &project(1)).is_err());
        assert!(check_access(&user(2, Role::Admin), &project(1)).is_ok());
    }
}
