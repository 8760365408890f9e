//! Domain types
//!
//! Core entities persisted by the store. Derived values (project completion,
//! remaining stock on report rows) are computed, never stored.

use serde::{Deserialize, Serialize};

/// Maximum number of images a project can hold
pub const PROJECT_IMAGE_LIMIT: usize = 5;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "client" => Some(Role::Client),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account. `password_hash` never leaves the store layer.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// An authenticated session resolved from a bearer token
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub expires_at: i64,
}

/// A client project with attached photos
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub note: Option<String>,
    pub duration: Option<String>,
    /// Stored image filenames, in upload order
    pub images: Vec<String>,
    pub created_at: String,
}

impl Project {
    /// Completion percentage derived from uploaded images, capped at 100
    pub fn completion(&self) -> u32 {
        (self.images.len().min(PROJECT_IMAGE_LIMIT) * 100 / PROJECT_IMAGE_LIMIT) as u32
    }
}

/// A furniture category holding inventory items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Furniture {
    pub id: i64,
    pub name: String,
    pub items: Vec<SubFurniture>,
    pub created_at: String,
}

/// One inventory item within a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubFurniture {
    /// Category-scoped item number, e.g. "T001"
    pub item_no: String,
    pub furniture_id: i64,
    pub name: String,
    /// Stored image filename, if one was uploaded
    pub image: Option<String>,
    pub price: f64,
    pub quantity: i64,
    pub created_at: String,
}

/// A daily sales report snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FurnitureReport {
    pub id: i64,
    /// Report date, formatted YYYY-MM-DD; unique
    pub date: String,
    pub signature: Option<String>,
    pub report_items: Vec<ReportItem>,
    pub created_at: String,
}

impl FurnitureReport {
    /// Sum of units sold across all rows
    pub fn total_sold(&self) -> i64 {
        self.report_items.iter().map(|i| i.sold).sum()
    }

    /// Sum of remaining stock across all rows; negative means oversold
    pub fn total_remaining(&self) -> i64 {
        self.report_items.iter().map(|i| i.remaining()).sum()
    }
}

/// One row of a daily sales report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportItem {
    pub item_no: String,
    pub item_name: String,
    /// Inventory count at the moment the report was generated
    pub initial_count: i64,
    pub sold: i64,
}

impl ReportItem {
    /// Remaining stock; may be negative when sales exceed the snapshot count
    pub fn remaining(&self) -> i64 {
        self.initial_count - self.sold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_with_images(n: usize) -> Project {
        Project {
            id: 1,
            user_id: 1,
            name: "p".to_string(),
            description: None,
            note: None,
            duration: None,
            images: (0..n).map(|i| format!("{}.jpg", i)).collect(),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_completion_scales_with_images() {
        assert_eq!(project_with_images(0).completion(), 0);
        assert_eq!(project_with_images(1).completion(), 20);
        assert_eq!(project_with_images(3).completion(), 60);
        assert_eq!(project_with_images(5).completion(), 100);
    }

    #[test]
    fn test_completion_caps_at_100() {
        assert_eq!(project_with_images(9).completion(), 100);
    }

    #[test]
    fn test_remaining_can_go_negative() {
        let item = ReportItem {
            item_no: "T001".to_string(),
            item_name: "Coffee Table".to_string(),
            initial_count: 3,
            sold: 5,
        };
        assert_eq!(item.remaining(), -2);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("CLIENT"), Some(Role::Client));
        assert_eq!(Role::parse("owner"), None);
    }
}
