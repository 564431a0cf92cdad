//! Order history handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use nightbloom_core::{Order, OrderId};

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireUser;
use crate::state::AppState;

/// `GET /api/orders` - the shopper's own orders, most recent first.
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(&user.uid)
        .await?;
    Ok(Json(orders))
}

/// `GET /api/orders/{id}` - one order.
///
/// Visible to its owner and to staff; everyone else gets 404 rather than
/// confirmation that the order exists.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if order.uid != user.uid && !user.is_staff() {
        return Err(AppError::NotFound(format!("order {id}")));
    }

    Ok(Json(order))
}
