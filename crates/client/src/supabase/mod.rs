//! Supabase collaborator clients.
//!
//! # Architecture
//!
//! - Supabase is the source of truth - NO local persistence, direct API calls
//! - Three services hang off one project URL:
//!   - `auth/v1` (GoTrue) - [`AuthClient`], session issuance
//!   - `rest/v1` (PostgREST) - [`Database`], the `profiles` and `kv_assets`
//!     tables
//!   - `storage/v1` - [`StorageClient`], the thumbnail bucket
//! - Wire rows live in [`types`] and convert totally into the canonical
//!   domain shapes; nothing outside this module sees a raw row.
//!
//! Every request carries the project `apikey` header; authenticated requests
//! add a bearer token. Store rejections map onto the shared
//! [`RemoteError`](crate::error::RemoteError) taxonomy: 401/403 become
//! `Denied`, other non-success statuses become `Api`.

mod auth;
mod db;
mod storage;
pub mod types;

pub use auth::AuthClient;
pub use db::Database;
pub use storage::StorageClient;

use serde::Deserialize;

use crate::error::RemoteError;

/// Error body shapes the Supabase services produce.
///
/// PostgREST uses `message`, GoTrue uses `error_description` or `msg`,
/// storage uses `error`/`message`. One lenient struct covers all of them.
#[derive(Debug, Deserialize, Default)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.error_description)
            .or(self.msg)
            .or(self.error)
    }
}

/// Map a non-success response to a [`RemoteError`], passing success through.
///
/// Consumes the response body on failure to extract the service's message.
pub(crate) async fn check_response(
    response: reqwest::Response,
) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| body.chars().take(200).collect());

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(RemoteError::Denied(message));
    }

    Err(RemoteError::Api {
        status: status.as_u16(),
        message,
    })
}
