//! Wire row types for the PostgREST tables and their conversions.
//!
//! The mapping between a wire row and the canonical domain shape is total:
//! every column maps to exactly one canonical field. `created_at` is the one
//! column with explicit defaulting - absent values stay `None` and sort as
//! oldest. Constrained columns (`campaign_type`, `category`, `email`) that
//! hold values outside their domain reject the row as malformed rather than
//! guessing; `role`/`status` default to the least-privileged reading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kv_library_core::{Asset, AssetId, CampaignType, Category, Email, Role, User, UserId, UserStatus};

use crate::error::RemoteError;

/// Display format for the derived `uploaded_date` string.
const UPLOADED_DATE_FORMAT: &str = "%Y-%m-%d";

/// A row of the `profiles` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProfileRow {
    /// Convert into the canonical [`User`].
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Malformed`] when the email column does not
    /// parse. Unknown role strings fall back to `Guest`, unknown status to
    /// `Active` - the store constrains both, so a mismatch here means the
    /// client is behind the schema and degrading privilege is the safe read.
    pub fn into_user(self) -> Result<User, RemoteError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RemoteError::Malformed(format!("profile {}: bad email: {e}", self.id))
        })?;

        let role = self
            .role
            .as_deref()
            .and_then(|r| r.parse::<Role>().ok())
            .unwrap_or(Role::Guest);
        let status = self
            .status
            .as_deref()
            .and_then(|s| s.parse::<UserStatus>().ok())
            .unwrap_or_default();

        let last_active = self
            .created_at
            .map(|ts| ts.format(UPLOADED_DATE_FORMAT).to_string())
            .unwrap_or_default();

        Ok(User {
            id: UserId::new(self.id),
            name: self.name.unwrap_or_default(),
            email,
            role,
            status,
            last_active,
            avatar: self.avatar.unwrap_or_default(),
        })
    }
}

/// A row of the `kv_assets` table.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetRow {
    pub id: String,
    pub name: String,
    pub campaign_type: String,
    pub category: String,
    #[serde(default)]
    pub uploaded_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub drive_link: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl AssetRow {
    /// Convert into the canonical [`Asset`].
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Malformed`] when `campaign_type` or `category`
    /// hold values outside their closed domains.
    pub fn into_asset(self) -> Result<Asset, RemoteError> {
        let campaign_type = self.campaign_type.parse::<CampaignType>().map_err(|e| {
            RemoteError::Malformed(format!("asset {}: {e}", self.id))
        })?;
        let category = self
            .category
            .parse::<Category>()
            .map_err(|e| RemoteError::Malformed(format!("asset {}: {e}", self.id)))?;

        let uploaded_date = self
            .uploaded_date
            .map(|ts| ts.format(UPLOADED_DATE_FORMAT).to_string())
            .unwrap_or_default();

        Ok(Asset {
            id: AssetId::new(self.id),
            name: self.name,
            campaign_type,
            category,
            uploaded_date,
            created_at: self.created_at,
            thumbnail: self.thumbnail.unwrap_or_default(),
            source: self.source.unwrap_or_default(),
            drive_link: self.drive_link.unwrap_or_default(),
            user_id: self.user_id.map(UserId::new),
        })
    }
}

/// Insert/update payload for the `kv_assets` table.
#[derive(Debug, Clone, Serialize)]
pub struct AssetWriteRow {
    pub name: String,
    pub campaign_type: String,
    pub category: String,
    pub source: String,
    pub uploaded_date: DateTime<Utc>,
    pub drive_link: String,
    pub thumbnail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Insert payload for the `profiles` table (admin-created users).
#[derive(Debug, Clone, Serialize)]
pub struct ProfileInsertRow {
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Update payload for the `profiles` table.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileWriteRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}
