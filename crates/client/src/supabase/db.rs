//! PostgREST client for the `profiles` and `kv_assets` tables.

use std::sync::Arc;

use tracing::{debug, instrument};

use kv_library_core::{Asset, AssetId, User, UserId};

use crate::catalog::store::{AssetRecord, AssetStore};
use crate::config::SupabaseConfig;
use crate::error::RemoteError;
use crate::identity::{NewProfile, ProfileChanges, ProfileStore, SessionHandle};

use super::check_response;
use super::types::{AssetRow, AssetWriteRow, ProfileInsertRow, ProfileRow, ProfileWriteRow};

/// Client for the relational store (PostgREST).
///
/// Implements [`ProfileStore`] and [`AssetStore`] over the two tables the
/// catalog uses. Row decoding and canonical mapping happen here; callers
/// only ever see domain types.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

struct DatabaseInner {
    client: reqwest::Client,
    rest_url: String,
    anon_key: String,
    session: SessionHandle,
}

impl Database {
    /// Create a new PostgREST client over a shared session slot.
    #[must_use]
    pub fn new(config: &SupabaseConfig, session: SessionHandle) -> Self {
        Self {
            inner: Arc::new(DatabaseInner {
                client: reqwest::Client::new(),
                rest_url: config.endpoint("rest/v1"),
                anon_key: config.anon_key().to_owned(),
                session,
            }),
        }
    }

    fn request(&self, method: reqwest::Method, table_and_query: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{table_and_query}", self.inner.rest_url);
        // Row-level security resolves the caller from the bearer token, so
        // authenticated requests must carry the session JWT, not the anon key.
        self.inner
            .client
            .request(method, url)
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(self.inner.session.bearer_token(&self.inner.anon_key))
    }

    fn asset_record_to_row(record: &AssetRecord) -> AssetWriteRow {
        AssetWriteRow {
            name: record.name.clone(),
            campaign_type: record.campaign_type.to_string(),
            category: record.category.to_string(),
            source: record.source.clone(),
            uploaded_date: record.uploaded_date,
            drive_link: record.drive_link.clone(),
            thumbnail: record.thumbnail.clone(),
            user_id: record.user_id.clone().map(UserId::into_inner),
        }
    }
}

impl ProfileStore for Database {
    #[instrument(skip(self))]
    async fn fetch(&self, user_id: &UserId) -> Result<Option<User>, RemoteError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("profiles?select=*&id=eq.{user_id}"),
            )
            .send()
            .await?;
        let rows: Vec<ProfileRow> = check_response(response).await?.json().await?;

        rows.into_iter().next().map(ProfileRow::into_user).transpose()
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, user_id: &UserId, changes: &ProfileChanges) -> Result<(), RemoteError> {
        let body = ProfileWriteRow {
            name: changes.name.clone(),
            avatar: changes.avatar.clone(),
        };
        let response = self
            .request(reqwest::Method::PATCH, &format!("profiles?id=eq.{user_id}"))
            .json(&body)
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<User>, RemoteError> {
        let response = self
            .request(
                reqwest::Method::GET,
                "profiles?select=*&order=created_at.desc",
            )
            .send()
            .await?;
        let rows: Vec<ProfileRow> = check_response(response).await?.json().await?;
        debug!(count = rows.len(), "loaded profile rows");

        rows.into_iter().map(ProfileRow::into_user).collect()
    }

    #[instrument(skip(self, profile), fields(email = %profile.email))]
    async fn insert(&self, profile: &NewProfile) -> Result<User, RemoteError> {
        let body = ProfileInsertRow {
            name: profile.name.clone(),
            email: profile.email.as_str().to_owned(),
            role: profile.role.to_string(),
        };
        let response = self
            .request(reqwest::Method::POST, "profiles")
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;
        let rows: Vec<ProfileRow> = check_response(response).await?.json().await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| RemoteError::Malformed("insert returned no row".to_owned()))?
            .into_user()
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: &UserId) -> Result<(), RemoteError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("profiles?id=eq.{user_id}"))
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }
}

impl AssetStore for Database {
    #[instrument(skip(self))]
    async fn list_newest_first(&self) -> Result<Vec<Asset>, RemoteError> {
        let response = self
            .request(
                reqwest::Method::GET,
                "kv_assets?select=*&order=uploaded_date.desc",
            )
            .send()
            .await?;
        let rows: Vec<AssetRow> = check_response(response).await?.json().await?;
        debug!(count = rows.len(), "loaded asset rows");

        rows.into_iter().map(AssetRow::into_asset).collect()
    }

    #[instrument(skip(self, record), fields(name = %record.name))]
    async fn insert(&self, record: &AssetRecord) -> Result<AssetId, RemoteError> {
        let response = self
            .request(reqwest::Method::POST, "kv_assets")
            // Ask PostgREST to echo the inserted row so we learn the id.
            .header("Prefer", "return=representation")
            .json(&Self::asset_record_to_row(record))
            .send()
            .await?;
        let rows: Vec<AssetRow> = check_response(response).await?.json().await?;

        rows.into_iter()
            .next()
            .map(|row| AssetId::new(row.id))
            .ok_or_else(|| RemoteError::Malformed("insert returned no row".to_owned()))
    }

    #[instrument(skip(self, record))]
    async fn update(&self, id: &AssetId, record: &AssetRecord) -> Result<(), RemoteError> {
        let response = self
            .request(reqwest::Method::PATCH, &format!("kv_assets?id=eq.{id}"))
            .json(&Self::asset_record_to_row(record))
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &AssetId) -> Result<(), RemoteError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("kv_assets?id=eq.{id}"))
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }
}
