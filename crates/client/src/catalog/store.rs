//! Contracts with the remote asset table and thumbnail bucket.

use chrono::{DateTime, Utc};

use kv_library_core::{Asset, AssetId, CampaignType, Category, UserId};

use crate::error::RemoteError;

/// A validated asset write, ready for the store.
///
/// Unlike [`kv_library_core::AssetDraft`], every required field is present;
/// the workflow is the only producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub name: String,
    pub campaign_type: CampaignType,
    pub category: Category,
    pub source: String,
    pub uploaded_date: DateTime<Utc>,
    pub drive_link: String,
    pub thumbnail: String,
    /// Author, when a signed-in user is known.
    pub user_id: Option<UserId>,
}

/// Contract with the relational store's `kv_assets` table.
///
/// The store orders reads natively; writes use equality filters on the id.
/// Access-control denials surface as [`RemoteError::Denied`].
pub trait AssetStore {
    /// Load the full collection in the store's upload-date descending order.
    fn list_newest_first(&self) -> impl Future<Output = Result<Vec<Asset>, RemoteError>> + Send;

    /// Insert a new asset and return the id the store assigned.
    fn insert(
        &self,
        record: &AssetRecord,
    ) -> impl Future<Output = Result<AssetId, RemoteError>> + Send;

    /// Replace the mutable fields of an existing asset, identity preserved.
    fn update(
        &self,
        id: &AssetId,
        record: &AssetRecord,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Delete an asset by id.
    fn delete(&self, id: &AssetId) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

/// Contract with the blob store's thumbnail bucket.
pub trait ThumbnailStore {
    /// Upload a binary payload under the given object key.
    fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Publicly resolvable URI for an object key.
    fn public_url(&self, key: &str) -> String;
}
