//! User and role management handlers.
//!
//! Roles live in the identity provider's claims; the `store.admins`
//! table is a denormalized mirror holding admin memberships only, kept
//! in sync here on every role change.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use nightbloom_core::Role;

use crate::db::roles::RoleRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAdmin;
use crate::state::AppState;

/// One row of the user listing, in the shape the role screen expects.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithRoles {
    pub uid: String,
    pub email: Option<String>,
    pub is_admin: bool,
    pub is_moderator: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub email: String,
    pub role: String,
}

/// `GET /api/getUsersWithRoles` - provider accounts with role flags.
pub async fn index(_staff: RequireAdmin, State(state): State<AppState>) -> Result<Json<Value>> {
    let users: Vec<UserWithRoles> = state
        .provider()
        .list_users()
        .await?
        .into_iter()
        .map(|u| UserWithRoles {
            uid: u.uid.to_string(),
            email: u.email,
            is_admin: u.role == Role::Admin,
            is_moderator: u.role == Role::Moderator,
        })
        .collect();

    Ok(Json(json!({ "users": users })))
}

/// `POST /api/setUserRole` - set a user's role by email.
///
/// Updates the provider claims first, then syncs the local admin
/// mirror: granting admin upserts the membership row, anything else
/// removes it.
pub async fn set_role(
    staff: RequireAdmin,
    State(state): State<AppState>,
    Json(req): Json<SetRoleRequest>,
) -> Result<Json<Value>> {
    let role = req
        .role
        .parse::<Role>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = state.provider().find_by_email(&req.email).await?;
    state.provider().set_role(&user.uid, role).await?;

    let roles = RoleRepository::new(state.pool());
    if role == Role::Admin {
        roles.grant(&user.uid, &req.email, role).await?;
    } else {
        roles.revoke(&user.uid).await?;
    }

    tracing::info!(
        uid = %user.uid,
        role = %role,
        granted_by = %staff.0.uid,
        "User role set"
    );
    Ok(Json(json!({ "message": format!("Role updated to {role}") })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_listing_wire_names() {
        let user = UserWithRoles {
            uid: "u1".to_owned(),
            email: Some("a@b.com".to_owned()),
            is_admin: true,
            is_moderator: false,
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["isAdmin"], json!(true));
        assert_eq!(value["isModerator"], json!(false));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("moderator".parse::<Role>().unwrap(), Role::Moderator);
        assert!("owner".parse::<Role>().is_err());
    }
}
