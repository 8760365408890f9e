//! # Furnish
//!
//! Furniture Business Management - A full-stack Rust application for managing
//! clients, projects, furniture inventory, and daily sales reporting.
//!
//! ## Features
//!
//! - **Accounts**: client and admin roles with bearer-token sessions
//! - **Projects**: per-client project tracking with photo uploads and a
//!   derived completion percentage
//! - **Inventory**: furniture categories with per-category item numbering
//! - **Reports**: one daily sales snapshot per date, with sold counts and
//!   remaining stock
//! - **PDF**: server-rendered daily reports, summaries and income statements
//!
//! ## Modules
//!
//! - [`store`]: SQLite persistence for every resource
//! - [`api`]: REST API server with Axum
//! - [`pdf`]: printable report rendering
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use furnish::store::{users::NewUser, Role, Store};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::open("./furnish_data")?;
//!
//!     let admin = store.create_user(NewUser {
//!         name: "Admin".to_string(),
//!         email: "admin@example.com".to_string(),
//!         password: "changeme".to_string(),
//!         role: Role::Admin,
//!     })?;
//!
//!     let tables = store.create_category("TABLE")?;
//!     println!("{} can now stock category {}", admin.name, tables.name);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod pdf;
pub mod store;

// Re-export top-level types for convenience
pub use store::{
    Furniture, FurnitureReport, Project, ReportItem, Role, Store, StoreError, StoreResult,
    SubFurniture, User,
};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use pdf::{IncomeStatement, PdfError, PdfResult};

pub use config::{Config, ConfigError};
