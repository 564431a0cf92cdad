//! Staff authentication extractors.
//!
//! The session carries a [`CurrentStaff`] written at sign-in, with the
//! role resolved from provider claims at that moment. `RequireStaff`
//! admits moderators and admins; `RequireAdmin` admits admins only.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;

use nightbloom_core::{Role, Uid};

/// Session key for the signed-in staff member.
pub const SESSION_STAFF_KEY: &str = "current_staff";

/// The signed-in staff member, as stored in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentStaff {
    pub uid: Uid,
    pub email: Option<String>,
    pub role: Role,
}

/// Error returned when staff authentication fails.
pub enum AuthRejection {
    /// No signed-in staff member.
    Unauthorized,
    /// Signed in, but the role is insufficient.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Forbidden" })),
            )
                .into_response(),
        }
    }
}

async fn staff_from_parts(parts: &mut Parts) -> Result<CurrentStaff, AuthRejection> {
    // Get the session from extensions (set by SessionManagerLayer)
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    session
        .get::<CurrentStaff>(SESSION_STAFF_KEY)
        .await
        .ok()
        .flatten()
        .ok_or(AuthRejection::Unauthorized)
}

/// Extractor admitting moderators and admins.
///
/// Order management is the only surface moderators can reach.
pub struct RequireStaff(pub CurrentStaff);

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let staff = staff_from_parts(parts).await?;
        if !staff.role.is_staff() {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(staff))
    }
}

/// Extractor admitting admins only.
pub struct RequireAdmin(pub CurrentStaff);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let staff = staff_from_parts(parts).await?;
        if staff.role != Role::Admin {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(staff))
    }
}

/// Helper to set the current staff member in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_staff(
    session: &Session,
    staff: &CurrentStaff,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(SESSION_STAFF_KEY, staff).await
}

/// Helper to clear the current staff member from the session (sign-out).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_staff(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentStaff>(SESSION_STAFF_KEY).await?;
    Ok(())
}
