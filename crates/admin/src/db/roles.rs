//! Staff role mirror.
//!
//! The identity provider's custom claims are the source of truth for
//! roles; this table is a queryable mirror kept in sync by the role
//! endpoints so "who is staff" never needs a provider round trip.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use nightbloom_core::{Role, Uid};

use super::RepositoryError;

/// One staff membership row.
#[derive(Debug, Clone)]
pub struct StaffMember {
    pub uid: Uid,
    pub email: String,
    pub role: Role,
    pub granted_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct StaffRow {
    uid: String,
    email: String,
    role: String,
    granted_at: DateTime<Utc>,
}

impl TryFrom<StaffRow> for StaffMember {
    type Error = RepositoryError;

    fn try_from(row: StaffRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;
        Ok(Self {
            uid: Uid::new(row.uid),
            email: row.email,
            role,
            granted_at: row.granted_at,
        })
    }
}

/// Repository for the staff role mirror.
pub struct RoleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RoleRepository<'a> {
    /// Create a new role repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all staff members.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored role is invalid.
    pub async fn list_all(&self) -> Result<Vec<StaffMember>, RepositoryError> {
        let rows = sqlx::query_as::<_, StaffRow>(
            r"
            SELECT uid, email, role, granted_at
            FROM store.admins
            ORDER BY granted_at
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(StaffMember::try_from).collect()
    }

    /// Record or update a staff membership.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn grant(&self, uid: &Uid, email: &str, role: Role) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO store.admins (uid, email, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (uid)
            DO UPDATE SET email = EXCLUDED.email, role = EXCLUDED.role,
                          granted_at = now()
            ",
        )
        .bind(uid.as_str())
        .bind(email)
        .bind(role.to_string())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove a staff membership. Removing a non-member is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn revoke(&self, uid: &Uid) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM store.admins WHERE uid = $1")
            .bind(uid.as_str())
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
