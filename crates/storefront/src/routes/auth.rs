//! Session handlers.
//!
//! The browser authenticates with the identity provider directly and
//! exchanges the resulting token for a server session here.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::db::carts::CartRepository;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub token: String,
}

/// `POST /api/session` - verify a provider token and start a session.
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<SignInRequest>,
) -> Result<Json<Value>> {
    let user = state.auth_provider().verify_token(&req.token).await?;

    // Rotate the session id on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("session rotation failed: {e}")))?;

    set_current_user(&session, &user)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    set_sentry_user(&user.uid, user.email.as_deref());

    // A signed-in shopper always has a cart to come back to.
    CartRepository::new(state.pool()).ensure(&user.uid).await?;

    tracing::info!(uid = %user.uid, role = %user.role, "Shopper signed in");
    Ok(Json(json!({
        "uid": user.uid,
        "email": user.email,
        "role": user.role,
    })))
}

/// `DELETE /api/session` - sign out.
pub async fn sign_out(session: Session) -> Result<Json<Value>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("session flush failed: {e}")))?;
    clear_sentry_user();

    Ok(Json(json!({ "ok": true })))
}
