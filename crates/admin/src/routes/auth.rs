//! Staff session handlers.
//!
//! Staff authenticate with the identity provider directly; the token is
//! exchanged for a server session here. Accounts without a staff role
//! never get a session.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::{CurrentStaff, clear_current_staff, set_current_staff};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub token: String,
}

/// `POST /api/session` - verify a provider token and start a staff session.
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<SignInRequest>,
) -> Result<Json<Value>> {
    let user = state.provider().verify_token(&req.token).await?;

    if !user.role.is_staff() {
        tracing::warn!(uid = %user.uid, "Back office sign-in refused, not staff");
        return Err(AppError::Forbidden("staff access required".to_owned()));
    }

    let staff = CurrentStaff {
        uid: user.uid,
        email: user.email,
        role: user.role,
    };

    // Rotate the session id on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("session rotation failed: {e}")))?;

    set_current_staff(&session, &staff)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    set_sentry_user(&staff.uid, staff.email.as_deref());

    tracing::info!(uid = %staff.uid, role = %staff.role, "Staff signed in");
    Ok(Json(json!({
        "uid": staff.uid,
        "email": staff.email,
        "role": staff.role,
    })))
}

/// `DELETE /api/session` - sign out.
pub async fn sign_out(session: Session) -> Result<Json<Value>> {
    clear_current_staff(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("session flush failed: {e}")))?;
    clear_sentry_user();

    Ok(Json(json!({ "ok": true })))
}
