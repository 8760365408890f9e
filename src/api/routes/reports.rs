//! Report Routes
//!
//! Daily sales reports and the printable artifacts derived from them.
//! Reads need a signed-in account; mutations are admin-only.
//!
//! - GET /api/v1/furniture-reports - Paginated listing, newest first
//! - GET /api/v1/furniture-reports/today - Today's report
//! - GET /api/v1/furniture-reports/date/:date - Report for a date
//! - POST /api/v1/furniture-reports/generate - Snapshot today's inventory
//! - PUT /api/v1/furniture-reports/update-sold - Sold counts on today's report
//! - PUT /api/v1/furniture-reports/signature - Signature on today's report
//! - GET /api/v1/furniture-reports/date/:date/pdf - Daily report PDF
//! - GET /api/v1/furniture-reports/summary/pdf - Summary PDF over all reports
//! - GET /api/v1/furniture-reports/export?format= - Flat csv/json download
//! - POST /api/v1/reports/income-statement - Income statement PDF

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::auth::{AdminUser, AuthUser};
use crate::api::dto::{
    ExportParams, IncomeStatementRequest, PageParams, ReportListResponse, ReportResponse,
    SignatureRequest, UpdateSoldRequest,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::pdf::{self, IncomeStatement};
use crate::store::reports::{today, SoldUpdate};
use crate::store::FurnitureReport;

/// GET /api/v1/furniture-reports
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<ReportListResponse>> {
    let page = state.store.list_reports(params.page, params.limit)?;

    Ok(Json(ReportListResponse {
        reports: page.reports.iter().map(ReportResponse::from).collect(),
        total: page.total,
        page: page.page,
        limit: page.limit,
    }))
}

/// GET /api/v1/furniture-reports/today
pub async fn today_report(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
) -> ApiResult<Json<ReportResponse>> {
    let report = state.store.report_for_date(&today())?;
    Ok(Json(ReportResponse::from(&report)))
}

/// GET /api/v1/furniture-reports/date/:date
pub async fn report_by_date(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(date): Path<String>,
) -> ApiResult<Json<ReportResponse>> {
    let date = validate_date(&date)?;
    let report = state.store.report_for_date(&date)?;
    Ok(Json(ReportResponse::from(&report)))
}

/// POST /api/v1/furniture-reports/generate
///
/// Snapshot the current inventory into today's report. Conflicts when a
/// report for today already exists; fetch /today in that case.
pub async fn generate_report(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<(StatusCode, Json<ReportResponse>)> {
    let date = today();
    let report = state.store.generate_report(&date)?;

    tracing::info!(date = %date, items = report.report_items.len(), "Generated daily report");

    Ok((StatusCode::CREATED, Json(ReportResponse::from(&report))))
}

/// PUT /api/v1/furniture-reports/update-sold
pub async fn update_sold(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<UpdateSoldRequest>,
) -> ApiResult<Json<ReportResponse>> {
    if req.item_updates.is_empty() {
        return Err(ApiError::Validation("No item updates provided".to_string()));
    }

    let updates: Vec<SoldUpdate> = req
        .item_updates
        .into_iter()
        .map(|u| SoldUpdate {
            item_no: u.item_no,
            sold: u.sold,
        })
        .collect();

    let report = state.store.update_sold(&today(), &updates)?;
    Ok(Json(ReportResponse::from(&report)))
}

/// PUT /api/v1/furniture-reports/signature
pub async fn set_signature(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<SignatureRequest>,
) -> ApiResult<Json<ReportResponse>> {
    let report = state.store.set_signature(&today(), req.signature.trim())?;
    Ok(Json(ReportResponse::from(&report)))
}

/// GET /api/v1/furniture-reports/date/:date/pdf
pub async fn report_pdf(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(date): Path<String>,
) -> ApiResult<Response> {
    let date = validate_date(&date)?;
    let report = state.store.report_for_date(&date)?;
    let bytes = pdf::furniture_report(&report)?;

    Ok(pdf_download(bytes, &format!("furniture-report-{}", date)))
}

/// GET /api/v1/furniture-reports/summary/pdf
pub async fn summary_pdf(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
) -> ApiResult<Response> {
    let reports = all_reports(&state)?;
    let bytes = pdf::reports_summary(&reports)?;

    Ok(pdf_download(
        bytes,
        &format!("furniture-reports-summary-{}", today()),
    ))
}

/// POST /api/v1/reports/income-statement
pub async fn income_statement_pdf(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Json(req): Json<IncomeStatementRequest>,
) -> ApiResult<Response> {
    for (label, amount) in [
        ("revenue", req.revenue),
        ("construction_cost", req.construction_cost),
        ("furniture_cost", req.furniture_cost),
        ("worker_payments", req.worker_payments),
        ("other_cost", req.other_cost),
    ] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ApiError::Validation(format!(
                "{} must be a non-negative number",
                label
            )));
        }
    }

    let statement = IncomeStatement {
        project_no: req.project_no.trim().to_string(),
        revenue: req.revenue,
        construction_cost: req.construction_cost,
        furniture_cost: req.furniture_cost,
        worker_payments: req.worker_payments,
        other_cost: req.other_cost,
    };

    let bytes = pdf::income_statement(&statement)?;

    let slug = if statement.project_no.is_empty() {
        "draft".to_string()
    } else {
        statement.project_no.replace(' ', "-")
    };

    Ok(pdf_download(bytes, &format!("income-statement-{}", slug)))
}

/// GET /api/v1/furniture-reports/export
///
/// Flat export of every report row, one line per item.
pub async fn export_reports(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Query(params): Query<ExportParams>,
) -> ApiResult<Response> {
    if !state.config.enable_export {
        return Err(ApiError::Validation("Export feature is disabled".to_string()));
    }

    let reports = all_reports(&state)?;

    let (content_type, body) = match params.format.to_lowercase().as_str() {
        "json" => ("application/json", format_json(&reports)?),
        "csv" => ("text/csv", format_csv(&reports)?),
        other => {
            return Err(ApiError::Validation(format!(
                "Unknown export format: {}. Use csv or json",
                other
            )))
        }
    };

    let filename = format!(
        "furniture-reports-{}.{}",
        today(),
        params.format.to_lowercase()
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}

/// All reports, newest first, without pagination
fn all_reports(state: &AppState) -> ApiResult<Vec<FurnitureReport>> {
    let mut reports = Vec::new();
    let mut page = 1;
    loop {
        let batch = state.store.list_reports(page, 100)?;
        let done = (page as i64) * 100 >= batch.total || batch.reports.is_empty();
        reports.extend(batch.reports);
        if done {
            break;
        }
        page += 1;
    }
    Ok(reports)
}

/// Accept report dates only in the stored YYYY-MM-DD shape
fn validate_date(date: &str) -> ApiResult<String> {
    match chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => Ok(parsed.format("%Y-%m-%d").to_string()),
        Err(_) => Err(ApiError::Validation(format!(
            "Cannot parse date: {}. Use YYYY-MM-DD",
            date
        ))),
    }
}

fn pdf_download(bytes: Vec<u8>, filename: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.pdf\"", filename),
            ),
        ],
        Body::from(bytes),
    )
        .into_response()
}

/// Format report rows as CSV
fn format_csv(reports: &[FurnitureReport]) -> ApiResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(["date", "item_no", "item_name", "initial_count", "sold", "remaining"])
        .map_err(|e| ApiError::Internal(format!("CSV error: {}", e)))?;

    for report in reports {
        for item in &report.report_items {
            let initial = item.initial_count.to_string();
            let sold = item.sold.to_string();
            let remaining = item.remaining().to_string();
            writer
                .write_record([
                    report.date.as_str(),
                    item.item_no.as_str(),
                    item.item_name.as_str(),
                    initial.as_str(),
                    sold.as_str(),
                    remaining.as_str(),
                ])
                .map_err(|e| ApiError::Internal(format!("CSV error: {}", e)))?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal(format!("CSV error: {}", e)))
}

/// Format report rows as a JSON array
fn format_json(reports: &[FurnitureReport]) -> ApiResult<String> {
    let records: Vec<serde_json::Value> = reports
        .iter()
        .flat_map(|report| {
            report.report_items.iter().map(|item| {
                serde_json::json!({
                    "date": report.date,
                    "item_no": item.item_no,
                    "item_name": item.item_name,
                    "initial_count": item.initial_count,
                    "sold": item.sold,
                    "remaining": item.remaining(),
                })
            })
        })
        .collect();

    serde_json::to_string_pretty(&records)
        .map_err(|e| ApiError::Internal(format!("JSON error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ReportItem;

    fn sample_report() -> FurnitureReport {
        FurnitureReport {
            id: 1,
            date: "2025-06-01".to_string(),
            signature: None,
            report_items: vec![ReportItem {
                item_no: "T001".to_string(),
                item_name: "Coffee Table".to_string(),
                initial_count: 5,
                sold: 2,
            }],
            created_at: String::new(),
        }
    }

    #[test]
    fn test_validate_date() {
        assert_eq!(validate_date("2025-06-01").unwrap(), "2025-06-01");
        assert!(validate_date("06/01/2025").is_err());
        assert!(validate_date("2025-13-01").is_err());
    }

    #[test]
    fn test_format_csv_includes_remaining() {
        let csv = format_csv(&[sample_report()]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "date,item_no,item_name,initial_count,sold,remaining"
        );
        assert_eq!(lines.next().unwrap(), "2025-06-01,T001,Coffee Table,5,2,3");
    }

    #[test]
    fn test_format_json_flattens_rows() {
        let json = format_json(&[sample_report()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["remaining"], 3);
    }
}
