//! GoTrue auth client (password grant).

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

use kv_library_core::{Email, UserId};

use crate::config::SupabaseConfig;
use crate::identity::{AuthError, IdentityGateway, Session, SessionHandle};

use super::check_response;

/// Client for the Supabase auth service.
///
/// Holds the current session the way the hosted SDK does: issued on
/// sign-in, dropped on sign-out, readable at any time. Session-change
/// pushes from elsewhere (expiry, logout in another client) arrive at the
/// application as [`crate::app::App::handle_session_change`] calls.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    token_url: String,
    logout_url: String,
    anon_key: String,
    session: SessionHandle,
}

/// Successful password-grant response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
}

impl AuthClient {
    /// Create a new auth client.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            inner: Arc::new(AuthClientInner {
                client: reqwest::Client::new(),
                token_url: config.endpoint("auth/v1/token?grant_type=password"),
                logout_url: config.endpoint("auth/v1/logout"),
                anon_key: config.anon_key().to_owned(),
                session: SessionHandle::default(),
            }),
        }
    }

    /// Handle the data-plane clients use to authenticate requests as the
    /// signed-in user.
    #[must_use]
    pub fn session_handle(&self) -> SessionHandle {
        self.inner.session.clone()
    }
}

impl IdentityGateway for AuthClient {
    fn session(&self) -> Option<Session> {
        self.inner.session.get()
    }

    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Session, AuthError> {
        debug!(email = %email, "password sign-in");

        let response = self
            .inner
            .client
            .post(&self.inner.token_url)
            .header("apikey", &self.inner.anon_key)
            .json(&serde_json::json!({
                "email": email.as_str(),
                "password": password,
            }))
            .send()
            .await
            .map_err(crate::error::RemoteError::from)?;

        // GoTrue answers bad credentials with 400, expired tokens with 401.
        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::UNAUTHORIZED
        {
            return Err(AuthError::InvalidCredentials);
        }

        let response = check_response(response).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(crate::error::RemoteError::from)?;

        let session = Session::new(
            UserId::new(token.user.id),
            SecretString::from(token.access_token),
        );
        self.inner.session.set(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.session() else {
            return Ok(());
        };
        // Drop the local session first: sign-out must succeed locally even
        // when the provider is unreachable.
        self.inner.session.set(None);

        let result = self
            .inner
            .client
            .post(&self.inner.logout_url)
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(session.access_token().expose_secret())
            .send()
            .await;

        match result {
            Ok(response) => {
                check_response(response).await?;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "remote logout failed, local session dropped");
                Err(AuthError::Service(e.into()))
            }
        }
    }
}
