//! Order management handlers.
//!
//! The only admin surface moderators can reach. Status changes are
//! unconstrained; the convenience endpoints exist because "mark
//! delivered" and "undo that" are the two most common actions.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use nightbloom_core::{Order, OrderId, OrderStatus};

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireStaff;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTrackingRequest {
    pub tracking_code: String,
}

/// `GET /api/orders` - all orders, most recent first, `?status=` filter.
pub async fn index(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>> {
    let status = query
        .status
        .map(|s| {
            s.parse::<OrderStatus>()
                .map_err(|e| AppError::BadRequest(e.to_string()))
        })
        .transpose()?;

    let orders = OrderRepository::new(state.pool()).list_all(status).await?;
    Ok(Json(json!({ "orders": orders })))
}

/// `GET /api/orders/{id}` - one order.
pub async fn show(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get(OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(Json(order))
}

/// `PUT /api/orders/{id}/status` - set any status.
pub async fn set_status(
    staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<Value>> {
    let status = req
        .status
        .parse::<OrderStatus>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    apply_status(&state, OrderId::new(id), status, &staff).await
}

/// `PUT /api/orders/{id}/tracking` - set the courier tracking code.
pub async fn set_tracking(
    staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<SetTrackingRequest>,
) -> Result<Json<Value>> {
    let id = OrderId::new(id);
    OrderRepository::new(state.pool())
        .set_tracking(id, &req.tracking_code)
        .await?;

    tracing::info!(order_id = %id, staff = %staff.0.uid, "Tracking code set");
    Ok(Json(json!({ "ok": true })))
}

/// `POST /api/orders/{id}/complete` - shortcut to `delivered`.
pub async fn complete(
    staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    apply_status(&state, OrderId::new(id), OrderStatus::Delivered, &staff).await
}

/// `POST /api/orders/{id}/uncomplete` - roll a completion back to `shipped`.
pub async fn uncomplete(
    staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    apply_status(&state, OrderId::new(id), OrderStatus::Shipped, &staff).await
}

/// `POST /api/orders/{id}/cancel` - shortcut to `cancelled`.
pub async fn cancel(
    staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    apply_status(&state, OrderId::new(id), OrderStatus::Cancelled, &staff).await
}

async fn apply_status(
    state: &AppState,
    id: OrderId,
    status: OrderStatus,
    staff: &RequireStaff,
) -> Result<Json<Value>> {
    OrderRepository::new(state.pool()).set_status(id, status).await?;

    tracing::info!(order_id = %id, status = %status, staff = %staff.0.uid, "Order status set");
    Ok(Json(json!({ "ok": true, "status": status })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_wire_name() {
        let req: SetTrackingRequest =
            serde_json::from_value(json!({ "trackingCode": "TRK123" })).unwrap();
        assert_eq!(req.tracking_code, "TRK123");
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert!("misplaced".parse::<OrderStatus>().is_err());
        assert_eq!(
            "delivered".parse::<OrderStatus>().unwrap(),
            OrderStatus::Delivered
        );
    }
}
