//! User profile domain type.

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::UserId;
use super::role::{Role, UserStatus};

/// A catalog user profile (domain type).
///
/// Produced by the identity resolver from an authenticated session plus the
/// remote `profiles` row. The role field is the only authorization signal
/// the client core consults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque identity key, stable across sessions.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Sign-in email address.
    pub email: Email,
    /// Authorization tier.
    pub role: Role,
    /// Account status.
    pub status: UserStatus,
    /// Last-activity display string.
    pub last_active: String,
    /// Avatar image URI.
    pub avatar: String,
}
