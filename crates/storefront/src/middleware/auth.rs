//! Authentication extractors for storefront routes.
//!
//! The session carries a [`CurrentUser`] written at sign-in. Handlers
//! declare what they need in their signature: `RequireUser` rejects
//! anonymous requests, `OptionalUser` just reports what it finds.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::services::auth::CurrentUser;

/// Session key for the signed-in user.
pub const SESSION_USER_KEY: &str = "current_user";

/// Extractor that requires a signed-in shopper.
///
/// Anonymous API requests get 401 Unauthorized; anything else redirects
/// to the sign-in page.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("orders for {}", user.uid)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Error returned when authentication is required but missing.
pub enum AuthRejection {
    /// Redirect to the sign-in page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user: CurrentUser = session
            .get(SESSION_USER_KEY)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                let is_api = parts.uri.path().starts_with("/api/");
                if is_api {
                    AuthRejection::Unauthorized
                } else {
                    AuthRejection::RedirectToLogin
                }
            })?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current shopper.
///
/// Unlike `RequireUser`, this does not reject anonymous requests.
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(SESSION_USER_KEY)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(SESSION_USER_KEY, user).await
}

/// Helper to clear the current user from the session (sign-out).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentUser>(SESSION_USER_KEY).await?;
    Ok(())
}
