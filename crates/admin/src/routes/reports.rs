//! Sales report handler.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAdmin;
use crate::reports::{ReportWindow, SalesReport, build_report};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub window: Option<String>,
}

/// `GET /api/reports?window=30` - sales report over a 7/30/90 day
/// window ending now. Defaults to 30 days.
pub async fn show(
    _staff: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<SalesReport>> {
    let window = match query.window {
        Some(raw) => raw
            .parse::<ReportWindow>()
            .map_err(AppError::BadRequest)?,
        None => ReportWindow::Month,
    };

    let to = Utc::now();
    let from = to - Duration::days(i64::try_from(window.days()).unwrap_or(30));

    let orders = OrderRepository::new(state.pool())
        .list_between(from, to)
        .await?;

    Ok(Json(build_report(&orders, from, to)))
}
