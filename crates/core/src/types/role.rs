//! Authorization roles and account status.

use serde::{Deserialize, Serialize};

/// Authorization tier for a catalog user.
///
/// The role is the sole authorization signal in the client core: navigation
/// guards consult it, and nothing else does. The store enforces its own
/// access control independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full access including the admin panel.
    Admin,
    /// May create and edit assets, no admin panel.
    Editor,
    /// Read-only browsing and downloads.
    Guest,
}

impl Role {
    /// Whether this role may create or edit assets.
    #[must_use]
    pub const fn can_author(self) -> bool {
        !matches!(self, Self::Guest)
    }

    /// Whether this role may open the admin panel.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "Admin"),
            Self::Editor => write!(f, "Editor"),
            Self::Guest => write!(f, "Guest"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "guest" => Ok(Self::Guest),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Account status of a catalog user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UserStatus {
    #[default]
    Active,
    Suspended,
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Suspended => write!(f, "Suspended"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            _ => Err(format!("invalid user status: {s}")),
        }
    }
}
