//! Furnish REST API
//!
//! HTTP API layer for Furnish, built with Axum.
//!
//! # Endpoints
//!
//! ## Users
//! - `POST /api/v1/users/register` - Create an account, returns a token
//! - `POST /api/v1/users/login` - Exchange credentials for a token
//! - `POST /api/v1/users/logout` - Invalidate the presented token
//! - `GET /api/v1/users` - List accounts (admin)
//! - `GET /api/v1/users/:id` - Get an account
//! - `PUT /api/v1/users/:id` - Update an account
//! - `DELETE /api/v1/users/:id` - Delete an account (admin)
//!
//! ## Projects
//! - `GET /api/v1/projects` - List projects
//! - `POST /api/v1/projects` - Create a project
//! - `GET /api/v1/projects/:id` - Get a project
//! - `PUT /api/v1/projects/:id` - Update a project
//! - `DELETE /api/v1/projects/:id` - Delete a project
//! - `POST /api/v1/projects/:id/images` - Attach a photo (max 5)
//! - `DELETE /api/v1/projects/:id/images/:filename` - Detach a photo
//!
//! ## Furniture
//! - `GET /api/v1/furniture` - List categories with items
//! - `POST /api/v1/furniture` - Create a category
//! - `GET /api/v1/furniture/:id` - Get a category
//! - `DELETE /api/v1/furniture/:id` - Delete a category
//! - `POST /api/v1/furniture/:id/items` - Create an item
//! - `PUT /api/v1/furniture/:id/items/:item_no` - Update an item
//! - `DELETE /api/v1/furniture/:id/items/:item_no` - Delete an item
//!
//! ## Reports
//! - `GET /api/v1/furniture-reports` - Paginated listing
//! - `GET /api/v1/furniture-reports/today` - Today's report
//! - `GET /api/v1/furniture-reports/date/:date` - Report for a date
//! - `POST /api/v1/furniture-reports/generate` - Snapshot the inventory
//! - `PUT /api/v1/furniture-reports/update-sold` - Update sold counts
//! - `PUT /api/v1/furniture-reports/signature` - Set the signature
//! - `GET /api/v1/furniture-reports/date/:date/pdf` - Daily report PDF
//! - `GET /api/v1/furniture-reports/summary/pdf` - Summary PDF
//! - `GET /api/v1/furniture-reports/export` - csv/json download
//! - `POST /api/v1/reports/income-statement` - Income statement PDF
//!
//! ## Media
//! - `GET /uploads/:filename` - Stored image bytes
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use furnish::api::{build_router, serve, ApiConfig, AppState};
//! use furnish::store::Store;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(Store::open("./furnish_data")?);
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(store, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod base64;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.max_upload_bytes;

    let api_routes = Router::new()
        // User routes
        .route("/users/register", post(routes::users::register))
        .route("/users/login", post(routes::users::login))
        .route("/users/logout", post(routes::users::logout))
        .route("/users", get(routes::users::list_users))
        .route("/users/:id", get(routes::users::get_user))
        .route("/users/:id", put(routes::users::update_user))
        .route("/users/:id", delete(routes::users::delete_user))
        // Project routes
        .route("/projects", get(routes::projects::list_projects))
        .route("/projects", post(routes::projects::create_project))
        .route("/projects/:id", get(routes::projects::get_project))
        .route("/projects/:id", put(routes::projects::update_project))
        .route("/projects/:id", delete(routes::projects::delete_project))
        .route("/projects/:id/images", post(routes::projects::add_image))
        .route(
            "/projects/:id/images/:filename",
            delete(routes::projects::remove_image),
        )
        // Furniture routes
        .route("/furniture", get(routes::furniture::list_categories))
        .route("/furniture", post(routes::furniture::create_category))
        .route("/furniture/:id", get(routes::furniture::get_category))
        .route("/furniture/:id", delete(routes::furniture::delete_category))
        .route("/furniture/:id/items", post(routes::furniture::create_item))
        .route(
            "/furniture/:id/items/:item_no",
            put(routes::furniture::update_item),
        )
        .route(
            "/furniture/:id/items/:item_no",
            delete(routes::furniture::delete_item),
        )
        // Report routes
        .route("/furniture-reports", get(routes::reports::list_reports))
        .route("/furniture-reports/today", get(routes::reports::today_report))
        .route(
            "/furniture-reports/date/:date",
            get(routes::reports::report_by_date),
        )
        .route(
            "/furniture-reports/generate",
            post(routes::reports::generate_report),
        )
        .route(
            "/furniture-reports/update-sold",
            put(routes::reports::update_sold),
        )
        .route(
            "/furniture-reports/signature",
            put(routes::reports::set_signature),
        )
        .route(
            "/furniture-reports/date/:date/pdf",
            get(routes::reports::report_pdf),
        )
        .route(
            "/furniture-reports/summary/pdf",
            get(routes::reports::summary_pdf),
        )
        .route(
            "/furniture-reports/export",
            get(routes::reports::export_reports),
        )
        .route(
            "/reports/income-statement",
            post(routes::reports::income_statement_pdf),
        )
        // Raised body limit for base64 image payloads
        .layer(DefaultBodyLimit::max(max_body));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .route("/uploads/:filename", get(routes::uploads::serve_upload))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()) // Configure properly in production
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Furnish API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Furnish API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tempfile::tempdir;
    use tower::util::ServiceExt;

    fn create_test_app() -> (Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let state = AppState::new(store, ApiConfig::default());
        let router = build_router(state);

        (router, dir)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    /// First registration on an empty store bootstraps the admin
    async fn register_admin(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/users/register",
                None,
                r#"{"name": "Admin", "email": "admin@example.com", "password": "adminpass", "role": "admin"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        body["token"].as_str().unwrap().to_string()
    }

    async fn register_client(app: &Router, email: &str) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/users/register",
                None,
                &format!(
                    r#"{{"name": "Client", "email": "{}", "password": "clientpass"}}"#,
                    email
                ),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (app, _dir) = create_test_app();

        for uri in ["/health/live", "/health/ready", "/health"] {
            let response = app.clone().oneshot(get_request(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{} failed", uri);
        }
    }

    #[tokio::test]
    async fn test_register_login_roundtrip() {
        let (app, _dir) = create_test_app();
        let _admin = register_admin(&app).await;

        // Correct credentials
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/users/login",
                None,
                r#"{"email": "admin@example.com", "password": "adminpass"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["user"]["role"], "admin");
        assert!(body["user"].get("password_hash").is_none());

        // Wrong password
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/users/login",
                None,
                r#"{"email": "admin@example.com", "password": "wrong"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (app, _dir) = create_test_app();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/users/register",
                None,
                r#"{"name": "", "email": "x@example.com", "password": "longenough"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (app, _dir) = create_test_app();
        register_admin(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/users/register",
                None,
                r#"{"name": "Dup", "email": "admin@example.com", "password": "adminpass"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let (app, _dir) = create_test_app();

        let response = app
            .clone()
            .oneshot(get_request("/api/v1/projects", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(get_request("/api/v1/furniture", Some("not-a-token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_endpoints_reject_clients() {
        let (app, _dir) = create_test_app();
        register_admin(&app).await;
        let client = register_client(&app, "c@example.com").await;

        let response = app
            .clone()
            .oneshot(get_request("/api/v1/users", Some(&client)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/furniture",
                Some(&client),
                r#"{"name": "TABLE"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_clients_cannot_see_others_projects() {
        let (app, _dir) = create_test_app();
        register_admin(&app).await;
        let alice = register_client(&app, "alice@example.com").await;
        let bob = register_client(&app, "bob@example.com").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/projects",
                Some(&alice),
                r#"{"name": "Villa"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let project = body_json(response).await;
        let project_id = project["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(get_request(
                &format!("/api/v1/projects/{}", project_id),
                Some(&bob),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Bob's listing stays empty
        let response = app
            .clone()
            .oneshot(get_request("/api/v1/projects", Some(&bob)))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_project_image_flow_and_limit() {
        let (app, _dir) = create_test_app();
        let admin = register_admin(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/projects",
                Some(&admin),
                r#"{"name": "Villa"}"#,
            ))
            .await
            .unwrap();
        let project = body_json(response).await;
        let project_id = project["id"].as_i64().unwrap();
        assert_eq!(project["completion"], 0);

        let image_body = format!(
            r#"{{"data": "{}", "format": "png"}}"#,
            base64::encode(b"fake png bytes")
        );

        let mut last = serde_json::Value::Null;
        for _ in 0..5 {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    &format!("/api/v1/projects/{}/images", project_id),
                    Some(&admin),
                    &image_body,
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
            last = body_json(response).await;
        }
        assert_eq!(last["completion"], 100);
        assert_eq!(last["images"].as_array().unwrap().len(), 5);

        // The sixth image is rejected
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/projects/{}/images", project_id),
                Some(&admin),
                &image_body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // Stored image is served back
        let image_url = last["images"][0].as_str().unwrap();
        let response = app.clone().oneshot(get_request(image_url, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap(),
            "image/png"
        );
    }

    #[tokio::test]
    async fn test_furniture_and_item_numbers() {
        let (app, _dir) = create_test_app();
        let admin = register_admin(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/furniture",
                Some(&admin),
                r#"{"name": "TABLE"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let category = body_json(response).await;
        let category_id = category["id"].as_i64().unwrap();

        for (expected_no, name) in [("T001", "Coffee Table"), ("T002", "Dining Table")] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    &format!("/api/v1/furniture/{}/items", category_id),
                    Some(&admin),
                    &format!(r#"{{"name": "{}", "price": 250.0, "quantity": 5}}"#, name),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
            let item = body_json(response).await;
            assert_eq!(item["item_no"], expected_no);
        }

        // Duplicate category name conflicts
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/furniture",
                Some(&admin),
                r#"{"name": "TABLE"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_report_lifecycle() {
        let (app, _dir) = create_test_app();
        let admin = register_admin(&app).await;

        // No report yet
        let response = app
            .clone()
            .oneshot(get_request("/api/v1/furniture-reports/today", Some(&admin)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Some inventory
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/furniture",
                Some(&admin),
                r#"{"name": "CHAIR"}"#,
            ))
            .await
            .unwrap();
        let category_id = body_json(response).await["id"].as_i64().unwrap();
        app.clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/furniture/{}/items", category_id),
                Some(&admin),
                r#"{"name": "Office Chair", "price": 120.0, "quantity": 10}"#,
            ))
            .await
            .unwrap();

        // Generate
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/furniture-reports/generate",
                Some(&admin),
                "",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let report = body_json(response).await;
        assert_eq!(report["report_items"][0]["initial_count"], 10);
        assert_eq!(report["report_items"][0]["remaining"], 10);
        let item_no = report["report_items"][0]["item_no"].as_str().unwrap().to_string();

        // Second generate conflicts
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/furniture-reports/generate",
                Some(&admin),
                "",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // Update sold, remaining recomputed
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/v1/furniture-reports/update-sold",
                Some(&admin),
                &format!(r#"{{"item_updates": [{{"item_no": "{}", "sold": 12}}]}}"#, item_no),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let report = body_json(response).await;
        assert_eq!(report["report_items"][0]["sold"], 12);
        assert_eq!(report["report_items"][0]["remaining"], -2);

        // Signature
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/v1/furniture-reports/signature",
                Some(&admin),
                r#"{"signature": "K. Perera"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let report = body_json(response).await;
        assert_eq!(report["signature"], "K. Perera");

        // Listing
        let response = app
            .clone()
            .oneshot(get_request("/api/v1/furniture-reports?page=1&limit=5", Some(&admin)))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["total"], 1);

        // PDF download for the report's date
        let date = report["date"].as_str().unwrap().to_string();
        let response = app
            .clone()
            .oneshot(get_request(
                &format!("/api/v1/furniture-reports/date/{}/pdf", date),
                Some(&admin),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap(),
            "application/pdf"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        // CSV export
        let response = app
            .clone()
            .oneshot(get_request(
                "/api/v1/furniture-reports/export?format=csv",
                Some(&admin),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"].to_str().unwrap(), "text/csv");
    }

    #[tokio::test]
    async fn test_income_statement_pdf() {
        let (app, _dir) = create_test_app();
        let admin = register_admin(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/reports/income-statement",
                Some(&admin),
                r#"{"project_no": "P-14", "revenue": 50000, "construction_cost": 20000,
                    "furniture_cost": 10000, "worker_payments": 5000, "other_cost": 1000}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_logout_invalidates_token() {
        let (app, _dir) = create_test_app();
        let admin = register_admin(&app).await;

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/v1/users/logout", Some(&admin), ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .clone()
            .oneshot(get_request("/api/v1/users", Some(&admin)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
