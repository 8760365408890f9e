//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::store::{Furniture, FurnitureReport, Project, ReportItem, SubFurniture, User};

// ============================================
// USER DTOs
// ============================================

/// Registration request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Role: client (default) or admin
    #[serde(default)]
    pub role: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token plus the signed-in user, returned by register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// A user with credentials stripped
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
            created_at: user.created_at.clone(),
        }
    }
}

/// Update user request; password only re-set when provided
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

// ============================================
// PROJECT DTOs
// ============================================

/// Create project request
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    /// Owner override, admin-only; defaults to the caller
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Update project request
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub note: Option<Option<String>>,
    #[serde(default)]
    pub duration: Option<Option<String>>,
}

/// Project response with derived completion percentage
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub note: Option<String>,
    pub duration: Option<String>,
    /// Image URLs under /uploads
    pub images: Vec<String>,
    /// Percentage of the five image slots filled, capped at 100
    pub completion: u32,
    pub created_at: String,
}

impl From<&Project> for ProjectResponse {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            user_id: project.user_id,
            name: project.name.clone(),
            description: project.description.clone(),
            note: project.note.clone(),
            duration: project.duration.clone(),
            images: project
                .images
                .iter()
                .map(|f| format!("/uploads/{}", f))
                .collect(),
            completion: project.completion(),
            created_at: project.created_at.clone(),
        }
    }
}

/// Inline image payload used by project and item uploads
#[derive(Debug, Deserialize)]
pub struct ImagePayload {
    /// Base64-encoded image data
    pub data: String,
    /// Image format: png or jpg
    pub format: String,
}

// ============================================
// FURNITURE DTOs
// ============================================

/// Create category request
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// Category with its items
#[derive(Debug, Serialize)]
pub struct FurnitureResponse {
    pub id: i64,
    pub name: String,
    pub items: Vec<SubFurnitureResponse>,
    pub created_at: String,
}

impl From<&Furniture> for FurnitureResponse {
    fn from(furniture: &Furniture) -> Self {
        Self {
            id: furniture.id,
            name: furniture.name.clone(),
            items: furniture.items.iter().map(SubFurnitureResponse::from).collect(),
            created_at: furniture.created_at.clone(),
        }
    }
}

/// One inventory item
#[derive(Debug, Serialize)]
pub struct SubFurnitureResponse {
    pub item_no: String,
    pub furniture_id: i64,
    pub name: String,
    pub image: Option<String>,
    pub price: f64,
    pub quantity: i64,
    pub created_at: String,
}

impl From<&SubFurniture> for SubFurnitureResponse {
    fn from(item: &SubFurniture) -> Self {
        Self {
            item_no: item.item_no.clone(),
            furniture_id: item.furniture_id,
            name: item.name.clone(),
            image: item.image.as_ref().map(|f| format!("/uploads/{}", f)),
            price: item.price,
            quantity: item.quantity,
            created_at: item.created_at.clone(),
        }
    }
}

/// List categories response
#[derive(Debug, Serialize)]
pub struct FurnitureListResponse {
    pub furniture: Vec<FurnitureResponse>,
    pub total: usize,
}

/// Create item request
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    /// Optional inline image
    #[serde(default)]
    pub image: Option<ImagePayload>,
}

/// Update item request
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

// ============================================
// REPORT DTOs
// ============================================

/// One row of a daily report, remaining included
#[derive(Debug, Serialize)]
pub struct ReportItemResponse {
    pub item_no: String,
    pub item_name: String,
    pub initial_count: i64,
    pub sold: i64,
    pub remaining: i64,
}

impl From<&ReportItem> for ReportItemResponse {
    fn from(item: &ReportItem) -> Self {
        Self {
            item_no: item.item_no.clone(),
            item_name: item.item_name.clone(),
            initial_count: item.initial_count,
            sold: item.sold,
            remaining: item.remaining(),
        }
    }
}

/// A daily report
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub id: i64,
    pub date: String,
    pub signature: Option<String>,
    pub report_items: Vec<ReportItemResponse>,
    pub created_at: String,
}

impl From<&FurnitureReport> for ReportResponse {
    fn from(report: &FurnitureReport) -> Self {
        Self {
            id: report.id,
            date: report.date.clone(),
            signature: report.signature.clone(),
            report_items: report
                .report_items
                .iter()
                .map(ReportItemResponse::from)
                .collect(),
            created_at: report.created_at.clone(),
        }
    }
}

/// Paginated report listing
#[derive(Debug, Serialize)]
pub struct ReportListResponse {
    pub reports: Vec<ReportResponse>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

/// One sold-count update
#[derive(Debug, Deserialize)]
pub struct ItemUpdateDto {
    pub item_no: String,
    pub sold: i64,
}

/// Update sold counts on today's report
#[derive(Debug, Deserialize)]
pub struct UpdateSoldRequest {
    pub item_updates: Vec<ItemUpdateDto>,
}

/// Set the signature on today's report
#[derive(Debug, Deserialize)]
pub struct SignatureRequest {
    pub signature: String,
}

/// Export query parameters
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    /// Format: csv or json
    #[serde(default = "default_export_format")]
    pub format: String,
}

fn default_export_format() -> String {
    "csv".to_string()
}

/// Income statement request; totals are computed server-side
#[derive(Debug, Deserialize)]
pub struct IncomeStatementRequest {
    #[serde(default)]
    pub project_no: String,
    pub revenue: f64,
    #[serde(default)]
    pub construction_cost: f64,
    #[serde(default)]
    pub furniture_cost: f64,
    #[serde(default)]
    pub worker_payments: f64,
    #[serde(default)]
    pub other_cost: f64,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy or unhealthy
    pub status: String,
    /// Store status
    pub store: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
