//! Status enums and roles.

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// Deliberately permissive: there is no enforced transition graph, and the
/// back office may set any status on any order at any time (free-form
/// corrections like `delivered` back to `shipped` are part of the workflow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Active,
    Packed,
    Dispatched,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
    Replaced,
}

impl OrderStatus {
    /// All statuses, in fulfillment-pipeline order, for filter UIs.
    pub const ALL: [Self; 8] = [
        Self::Active,
        Self::Packed,
        Self::Dispatched,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
        Self::Refunded,
        Self::Replaced,
    ];
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Packed => "packed",
            Self::Dispatched => "dispatched",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Replaced => "replaced",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "packed" => Ok(Self::Packed),
            "dispatched" => Ok(Self::Dispatched),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            "replaced" => Ok(Self::Replaced),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Outcome of the payment that created an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Success,
    Failed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

/// Role derived from the identity provider's custom claims.
///
/// The claim names themselves never leave the provider client; everything
/// else in the codebase checks against this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular shopper, no back-office access.
    #[default]
    User,
    /// Order management access only.
    Moderator,
    /// Full back-office access.
    Admin,
}

impl Role {
    /// Whether this role grants any back-office access.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Moderator | Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Moderator => write!(f, "moderator"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_roundtrip() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("misplaced".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_serde() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Dispatched).unwrap(),
            "\"dispatched\""
        );
        let status: OrderStatus = serde_json::from_str("\"refunded\"").unwrap();
        assert_eq!(status, OrderStatus::Refunded);
    }

    #[test]
    fn test_role_staff() {
        assert!(!Role::User.is_staff());
        assert!(Role::Moderator.is_staff());
        assert!(Role::Admin.is_staff());
    }

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::User, Role::Moderator, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }
}
