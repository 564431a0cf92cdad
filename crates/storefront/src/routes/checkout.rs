//! Checkout handlers.
//!
//! The delivery form is session state, saved one field per request as the
//! shopper types. Confirm places the order and empties both the cart and
//! the saved form.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;

use nightbloom_core::Price;

use crate::error::{AppError, Result};
use crate::middleware::auth::RequireUser;
use crate::services::checkout::{
    CHECKOUT_FORM_SESSION_KEY, CheckoutForm, FormField, delivery_fee,
};
use crate::state::AppState;

/// The checkout page payload: the saved form plus live totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub form: CheckoutForm,
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub total: Price,
    pub block_checkout: bool,
}

#[derive(Debug, Deserialize)]
pub struct SaveFieldRequest {
    pub field: FormField,
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub payment_id: String,
}

async fn load_form(session: &Session) -> Result<CheckoutForm> {
    Ok(session
        .get::<CheckoutForm>(CHECKOUT_FORM_SESSION_KEY)
        .await
        .map_err(|e| AppError::Internal(format!("session read failed: {e}")))?
        .unwrap_or_default())
}

async fn store_form(session: &Session, form: &CheckoutForm) -> Result<()> {
    session
        .insert(CHECKOUT_FORM_SESSION_KEY, form)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))
}

/// `GET /api/checkout` - the saved form with live totals.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    session: Session,
) -> Result<Json<CheckoutView>> {
    let form = load_form(&session).await?;
    let snapshot = state.cart_service().fetch(&user.uid).await?;

    let names: Vec<&str> = snapshot.items.iter().map(|i| i.item_name.as_str()).collect();
    let fee = delivery_fee(&names, snapshot.subtotal, form.delivery_fee);
    let total = snapshot.subtotal + fee;

    Ok(Json(CheckoutView {
        form,
        subtotal: snapshot.subtotal,
        delivery_fee: fee,
        total,
        block_checkout: snapshot.block_checkout,
    }))
}

/// `PUT /api/checkout/field` - save one form field.
pub async fn save_field(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    session: Session,
    Json(req): Json<SaveFieldRequest>,
) -> Result<Json<CheckoutForm>> {
    let mut form = load_form(&session).await?;
    state
        .checkout_service()
        .apply_field(&mut form, req.field, req.value)
        .await;
    store_form(&session, &form).await?;
    Ok(Json(form))
}

/// `POST /api/checkout/confirm` - place the order.
pub async fn confirm(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    session: Session,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<Value>> {
    let form = load_form(&session).await?;

    let order_id = state
        .checkout_service()
        .create_order(&user.uid, &form, &req.payment_id)
        .await?;

    // The form has served its purpose; the next order starts clean.
    session
        .remove::<CheckoutForm>(CHECKOUT_FORM_SESSION_KEY)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;

    Ok(Json(json!({ "orderId": order_id })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_save_field_request_parses_camel_case_field() {
        let req: SaveFieldRequest =
            serde_json::from_str(r#"{"field": "postalCode", "value": "100001"}"#).unwrap();
        assert_eq!(req.field, FormField::PostalCode);
        assert_eq!(req.value, "100001");
    }

    #[test]
    fn test_confirm_request_wire_name() {
        let req: ConfirmRequest = serde_json::from_str(r#"{"paymentId": "pay_9"}"#).unwrap();
        assert_eq!(req.payment_id, "pay_9");
    }
}
