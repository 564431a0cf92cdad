//! Staff role mirror commands.
//!
//! These touch only the local `store.admins` mirror. Provider claims are
//! the source of truth and are managed through the back office; this
//! command exists to bootstrap the very first admin before the back
//! office is reachable.

use sqlx::PgPool;

use nightbloom_core::Role;

use super::{CommandError, database_url};

/// Record a staff membership in the mirror.
///
/// # Errors
///
/// Returns `CommandError::InvalidArgument` for non-staff roles, database
/// errors otherwise.
pub async fn grant(uid: &str, email: &str, role: &str) -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let role: Role = role
        .parse()
        .map_err(|_| CommandError::InvalidArgument(format!("invalid role: {role}")))?;
    if !role.is_staff() {
        return Err(CommandError::InvalidArgument(
            "role must be admin or moderator".to_owned(),
        ));
    }
    if !email.contains('@') {
        return Err(CommandError::InvalidArgument(format!(
            "invalid email: {email}"
        )));
    }

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url()?).await?;

    sqlx::query(
        r"
        INSERT INTO store.admins (uid, email, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (uid)
        DO UPDATE SET email = EXCLUDED.email, role = EXCLUDED.role,
                      granted_at = now()
        ",
    )
    .bind(uid)
    .bind(email)
    .bind(role.to_string())
    .execute(&pool)
    .await?;

    tracing::info!("Recorded {role} membership for {email} ({uid})");
    tracing::warn!(
        "The provider claim is the source of truth; set it through the back office as well."
    );
    Ok(())
}

/// Remove a staff membership from the mirror.
///
/// # Errors
///
/// Returns `CommandError::Database` if the statement fails.
pub async fn revoke(uid: &str) -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url()?).await?;

    let result = sqlx::query("DELETE FROM store.admins WHERE uid = $1")
        .bind(uid)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        tracing::warn!("No membership found for {uid}");
    } else {
        tracing::info!("Removed membership for {uid}");
    }
    Ok(())
}
