//! Mutation sequencing for asset create/update/delete.
//!
//! The order is fixed: validate locally, then upload any attachment, then
//! write the record. A failure at any step aborts the whole operation - if
//! the upload fails the record write is never attempted, so the store can
//! never hold a broken thumbnail reference. The workflow reports success
//! exactly once per successful mutation; collection reload and navigation
//! are the caller's follow-up.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use kv_library_core::{AssetDraft, AssetId, UserId};

use crate::error::{RemoteError, ValidationError};

use super::store::{AssetRecord, AssetStore, ThumbnailStore};

/// Thumbnail used when a new asset is created without an attachment.
pub const PLACEHOLDER_THUMBNAIL: &str = "https://placehold.co/400x250?text=KV";

/// A binary payload attached on the input form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Original file name; only the extension is kept for the object key.
    pub file_name: String,
    /// MIME type forwarded to the bucket.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Why a mutation did not complete.
#[derive(Debug, Error)]
pub enum MutationError {
    /// Local validation failed; no remote call was issued.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A collaborator rejected the upload or the record write.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Sequences asset mutations against the store and bucket.
pub struct AssetWorkflow<'a, A, T> {
    assets: &'a A,
    thumbnails: &'a T,
}

impl<'a, A: AssetStore, T: ThumbnailStore> AssetWorkflow<'a, A, T> {
    /// Create a workflow over the two collaborators.
    pub const fn new(assets: &'a A, thumbnails: &'a T) -> Self {
        Self { assets, thumbnails }
    }

    /// Create a new asset from a draft.
    ///
    /// Without an attachment the record gets [`PLACEHOLDER_THUMBNAIL`].
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::Validation`] when required fields are
    /// missing (no network call is made), or [`MutationError::Remote`] when
    /// the upload or the insert is rejected.
    pub async fn create(
        &self,
        draft: &AssetDraft,
        attachment: Option<Attachment>,
        author: Option<&UserId>,
    ) -> Result<AssetId, MutationError> {
        let mut record = validated_record(draft, author)?;

        record.thumbnail = match attachment {
            Some(attachment) => self.store_attachment(attachment).await?,
            None => PLACEHOLDER_THUMBNAIL.to_owned(),
        };

        let id = self.assets.insert(&record).await?;
        info!(asset_id = %id, name = %record.name, "asset created");
        Ok(id)
    }

    /// Replace the mutable fields of an existing asset.
    ///
    /// Without a new attachment the existing thumbnail reference is kept
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::create`].
    pub async fn update(
        &self,
        id: &AssetId,
        draft: &AssetDraft,
        attachment: Option<Attachment>,
        existing_thumbnail: &str,
        author: Option<&UserId>,
    ) -> Result<(), MutationError> {
        let mut record = validated_record(draft, author)?;

        record.thumbnail = match attachment {
            Some(attachment) => self.store_attachment(attachment).await?,
            None => existing_thumbnail.to_owned(),
        };

        self.assets.update(id, &record).await?;
        info!(asset_id = %id, "asset updated");
        Ok(())
    }

    /// Delete an asset by id.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the store rejects the delete, including
    /// access-control denial; the caller's state stays unchanged.
    pub async fn delete(&self, id: &AssetId) -> Result<(), RemoteError> {
        self.assets.delete(id).await?;
        info!(asset_id = %id, "asset deleted");
        Ok(())
    }

    async fn store_attachment(&self, attachment: Attachment) -> Result<String, RemoteError> {
        let key = object_key(&attachment.file_name);
        debug!(key = %key, "uploading thumbnail");
        self.thumbnails
            .upload(&key, attachment.bytes, &attachment.content_type)
            .await?;
        Ok(self.thumbnails.public_url(&key))
    }
}

/// Validate a draft and build the store record.
fn validated_record(
    draft: &AssetDraft,
    author: Option<&UserId>,
) -> Result<AssetRecord, ValidationError> {
    let missing = draft.missing_fields();
    if !missing.is_empty() {
        return Err(ValidationError { missing });
    }
    let (Some(campaign_type), Some(category)) = (draft.campaign_type, draft.category) else {
        return Err(ValidationError {
            missing: draft.missing_fields(),
        });
    };

    Ok(AssetRecord {
        name: draft.name.clone(),
        campaign_type,
        category,
        source: draft.source.clone(),
        uploaded_date: parse_form_date(&draft.uploaded_date),
        drive_link: draft.drive_link.clone(),
        thumbnail: String::new(),
        user_id: author.cloned(),
    })
}

/// Parse the form's ISO date into a store timestamp, falling back to now.
fn parse_form_date(date: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Object key for an uploaded thumbnail: a fresh uuid keeping the extension.
fn object_key(file_name: &str) -> String {
    let id = Uuid::new_v4();
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!("{id}.{ext}"),
        _ => id.to_string(),
    }
}
