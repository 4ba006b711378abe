//! Storage client for the thumbnail bucket.

use std::sync::Arc;

use tracing::instrument;

use crate::catalog::store::ThumbnailStore;
use crate::config::SupabaseConfig;
use crate::error::RemoteError;
use crate::identity::SessionHandle;

use super::check_response;

/// Client for the blob store's named bucket.
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

struct StorageClientInner {
    client: reqwest::Client,
    object_url: String,
    public_url: String,
    anon_key: String,
    session: SessionHandle,
}

impl StorageClient {
    /// Create a storage client for the configured bucket, sharing the auth
    /// client's session slot.
    #[must_use]
    pub fn new(config: &SupabaseConfig, session: SessionHandle) -> Self {
        let bucket = &config.thumbnail_bucket;
        Self {
            inner: Arc::new(StorageClientInner {
                client: reqwest::Client::new(),
                object_url: config.endpoint(&format!("storage/v1/object/{bucket}")),
                public_url: config.endpoint(&format!("storage/v1/object/public/{bucket}")),
                anon_key: config.anon_key().to_owned(),
                session,
            }),
        }
    }
}

impl ThumbnailStore for StorageClient {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), RemoteError> {
        let response = self
            .inner
            .client
            .post(format!("{}/{key}", self.inner.object_url))
            .header("apikey", &self.inner.anon_key)
            // Bucket policies resolve the caller from the bearer token.
            .bearer_auth(self.inner.session.bearer_token(&self.inner.anon_key))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.inner.public_url)
    }
}
