//! Furniture Routes
//!
//! Inventory categories and their numbered items. Reads need a signed-in
//! account; mutations are admin-only.
//!
//! - GET /api/v1/furniture - List categories with items
//! - POST /api/v1/furniture - Create a category
//! - GET /api/v1/furniture/:id - Get a category
//! - DELETE /api/v1/furniture/:id - Delete a category and its items
//! - POST /api/v1/furniture/:id/items - Create an item (allocates item no)
//! - PUT /api/v1/furniture/:id/items/:item_no - Update an item
//! - DELETE /api/v1/furniture/:id/items/:item_no - Delete an item

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::auth::{AdminUser, AuthUser};
use crate::api::dto::{
    CreateCategoryRequest, CreateItemRequest, FurnitureListResponse, FurnitureResponse,
    SubFurnitureResponse, UpdateItemRequest,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::store_image;
use crate::api::state::AppState;
use crate::store::furniture::{ItemUpdate, NewItem};

/// GET /api/v1/furniture
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
) -> ApiResult<Json<FurnitureListResponse>> {
    let categories = state.store.list_categories()?;

    Ok(Json(FurnitureListResponse {
        total: categories.len(),
        furniture: categories.iter().map(FurnitureResponse::from).collect(),
    }))
}

/// POST /api/v1/furniture
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<FurnitureResponse>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation(
            "Category name cannot be empty".to_string(),
        ));
    }

    let category = state.store.create_category(name)?;

    tracing::info!(category_id = category.id, name = %category.name, "Created category");

    Ok((StatusCode::CREATED, Json(FurnitureResponse::from(&category))))
}

/// GET /api/v1/furniture/:id
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<FurnitureResponse>> {
    let category = state.store.get_category(id)?;
    Ok(Json(FurnitureResponse::from(&category)))
}

/// DELETE /api/v1/furniture/:id
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.store.delete_category(id)?;

    tracing::info!(category_id = id, "Deleted category");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/furniture/:id/items
///
/// Creates an item and allocates the next item number in the category.
/// An inline image, when present, is stored before the insert; the store
/// removes the file again if the insert cannot complete.
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i64>,
    Json(req): Json<CreateItemRequest>,
) -> ApiResult<(StatusCode, Json<SubFurnitureResponse>)> {
    validate_item_fields(&req.name, req.price, req.quantity)?;

    let image = match &req.image {
        Some(payload) => Some(store_image(&state, payload)?),
        None => None,
    };

    let item = state.store.create_item(
        id,
        NewItem {
            name: req.name.trim().to_string(),
            price: req.price,
            quantity: req.quantity,
            image,
        },
    )?;

    tracing::info!(category_id = id, item_no = %item.item_no, "Created item");

    Ok((StatusCode::CREATED, Json(SubFurnitureResponse::from(&item))))
}

/// PUT /api/v1/furniture/:id/items/:item_no
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path((id, item_no)): Path<(i64, String)>,
    Json(req): Json<UpdateItemRequest>,
) -> ApiResult<Json<SubFurnitureResponse>> {
    if let Some(name) = &req.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("Item name cannot be empty".to_string()));
        }
    }
    if let Some(price) = req.price {
        validate_price(price)?;
    }
    if let Some(quantity) = req.quantity {
        validate_quantity(quantity)?;
    }

    let item = state.store.update_item(
        id,
        &item_no,
        ItemUpdate {
            name: req.name.map(|n| n.trim().to_string()),
            price: req.price,
            quantity: req.quantity,
        },
    )?;

    Ok(Json(SubFurnitureResponse::from(&item)))
}

/// DELETE /api/v1/furniture/:id/items/:item_no
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path((id, item_no)): Path<(i64, String)>,
) -> ApiResult<StatusCode> {
    state.store.delete_item(id, &item_no)?;

    tracing::info!(category_id = id, item_no = %item_no, "Deleted item");

    Ok(StatusCode::NO_CONTENT)
}

fn validate_item_fields(name: &str, price: f64, quantity: i64) -> ApiResult<()> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("Item name cannot be empty".to_string()));
    }
    validate_price(price)?;
    validate_quantity(quantity)
}

fn validate_price(price: f64) -> ApiResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::Validation(
            "Price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

fn validate_quantity(quantity: i64) -> ApiResult<()> {
    if quantity < 0 {
        return Err(ApiError::Validation(
            "Quantity cannot be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_fields() {
        assert!(validate_item_fields("Chair", 10.0, 5).is_ok());
        assert!(validate_item_fields("", 10.0, 5).is_err());
        assert!(validate_item_fields("Chair", -1.0, 5).is_err());
        assert!(validate_item_fields("Chair", f64::NAN, 5).is_err());
        assert!(validate_item_fields("Chair", 10.0, -1).is_err());
    }
}
