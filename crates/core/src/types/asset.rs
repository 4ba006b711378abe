//! The canonical KV asset shape and its draft form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{AssetId, UserId};

/// Campaign type of a KV asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampaignType {
    Digital,
    Traditional,
}

impl std::fmt::Display for CampaignType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Digital => write!(f, "Digital"),
            Self::Traditional => write!(f, "Traditional"),
        }
    }
}

impl std::str::FromStr for CampaignType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "digital" => Ok(Self::Digital),
            "traditional" => Ok(Self::Traditional),
            _ => Err(format!("invalid campaign type: {s}")),
        }
    }
}

/// Product category of a KV asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Mobile,
    Household,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mobile => write!(f, "Mobile"),
            Self::Household => write!(f, "Household"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mobile" => Ok(Self::Mobile),
            "household" => Ok(Self::Household),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}

/// A marketing creative record ("KV") with metadata and a thumbnail link.
///
/// The in-memory collection of these is a view of the remote store, never
/// the source of truth: it is invalidated and reloaded after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Stable external key, unique within the collection.
    pub id: AssetId,
    /// Human-facing asset name.
    pub name: String,
    /// Digital or Traditional campaign.
    pub campaign_type: CampaignType,
    /// Product category the creative targets.
    pub category: Category,
    /// Display string derived from the stored upload timestamp.
    pub uploaded_date: String,
    /// Authoritative sort key. Absent values sort as oldest.
    pub created_at: Option<DateTime<Utc>>,
    /// Public URI of the thumbnail image.
    pub thumbnail: String,
    /// Free-form originating unit label (HQ, Area, Region observed).
    pub source: String,
    /// URI to the full-resolution asset.
    pub drive_link: String,
    /// Authoring user, when recorded.
    pub user_id: Option<UserId>,
}

impl Asset {
    /// Timestamp used for newest-first ordering.
    ///
    /// Assets without a parsable `created_at` sort as epoch zero, i.e.
    /// oldest.
    #[must_use]
    pub fn sort_timestamp(&self) -> DateTime<Utc> {
        self.created_at.unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// User-editable fields of an asset, as entered on the input form.
///
/// Identity and thumbnail handling stay out of the draft: the id is chosen
/// by the store and the thumbnail comes from the attachment path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetDraft {
    pub name: String,
    pub campaign_type: Option<CampaignType>,
    pub category: Option<Category>,
    pub source: String,
    /// Upload date as entered on the form (ISO date).
    pub uploaded_date: String,
    pub drive_link: String,
}

impl AssetDraft {
    /// Names of required fields that are absent from the draft.
    ///
    /// An empty return means the draft passes local validation. Matches the
    /// form's required set: name, campaign type, category, and source.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.campaign_type.is_none() {
            missing.push("campaign type");
        }
        if self.category.is_none() {
            missing.push("category");
        }
        if self.source.trim().is_empty() {
            missing.push("source");
        }
        missing
    }
}
