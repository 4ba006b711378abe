//! Session handling and identity resolution.
//!
//! The auth collaborator issues opaque sessions; the profile collaborator
//! holds the `profiles` row keyed by user id. The resolver turns the pair
//! into a typed [`User`]. It touches nothing else - in particular it never
//! mutates the asset collection.
//!
//! # Precondition on the collaborators
//!
//! Profile rows created out of band (e.g. by an admin pre-creating users)
//! only become signable once a matching identity record exists at the auth
//! provider; creating that record is an operator step outside this codebase.
//! Until then, and for sessions whose profile row is missing, resolution
//! yields [`IdentityError::ProfileNotFound`] - a recoverable condition that
//! degrades to the unauthenticated presentation, never a fault.

use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::debug;

use kv_library_core::{Email, Role, User, UserId};

use crate::error::RemoteError;

/// An authenticated session handle issued by the auth collaborator.
#[derive(Debug, Clone)]
pub struct Session {
    user_id: UserId,
    access_token: SecretString,
}

impl Session {
    /// Create a session from the collaborator's token response.
    #[must_use]
    pub fn new(user_id: UserId, access_token: SecretString) -> Self {
        Self {
            user_id,
            access_token,
        }
    }

    /// The identity this session was issued for.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Bearer token for authenticated requests.
    #[must_use]
    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }
}

/// Shared slot holding the current session.
///
/// The auth client writes it on sign-in and sign-out; the data-plane
/// clients read it to authenticate requests as the signed-in user. Clones
/// share the underlying slot.
#[derive(Clone, Default)]
pub struct SessionHandle {
    inner: Arc<Mutex<Option<Session>>>,
}

impl SessionHandle {
    /// The current session, if any.
    #[must_use]
    pub fn get(&self) -> Option<Session> {
        self.inner.lock().ok().and_then(|guard| guard.clone())
    }

    /// Replace the current session.
    pub fn set(&self, session: Option<Session>) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = session;
        }
    }

    /// Bearer token for data-plane requests: the signed-in user's JWT when
    /// a session exists, else the anon fallback. The store's row-level
    /// access control sees the authenticated user only through this token.
    #[must_use]
    pub fn bearer_token(&self, anon_fallback: &str) -> String {
        self.get().map_or_else(
            || anon_fallback.to_owned(),
            |session| session.access_token().expose_secret().to_owned(),
        )
    }
}

/// Errors from the auth collaborator.
///
/// Surfaced inline on the login surface; retry is simply re-submission.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or password, or an expired session.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The auth service failed for another reason.
    #[error("auth service error: {0}")]
    Service(#[from] RemoteError),
}

/// Errors from resolving a session to a profile.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Authenticated session with no matching profile row.
    #[error("no profile found for user {0}")]
    ProfileNotFound(UserId),

    /// The profile store failed the read.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Contract with the auth collaborator (session issuance and teardown).
pub trait IdentityGateway {
    /// The currently held session, if any.
    fn session(&self) -> Option<Session>;

    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on bad credentials and
    /// [`AuthError::Service`] when the provider itself fails.
    fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> impl Future<Output = Result<Session, AuthError>> + Send;

    /// Discard the current session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Service`] when the provider rejects the logout;
    /// the local session is dropped regardless.
    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send;
}

/// Fields of a profile a user may change about themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    /// New display name, if changed.
    pub name: Option<String>,
    /// New avatar URI, if changed.
    pub avatar: Option<String>,
}

impl ProfileChanges {
    /// Whether there is anything to write.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.avatar.is_none()
    }
}

/// Fields required to create a profile row from the admin panel.
///
/// The matching identity record at the auth provider is an out-of-band
/// operator step; until it exists the new profile cannot sign in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub name: String,
    pub email: Email,
    pub role: Role,
}

/// Contract with the relational store's `profiles` table.
pub trait ProfileStore {
    /// Fetch the profile row for a user id, `None` when absent.
    fn fetch(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Option<User>, RemoteError>> + Send;

    /// Apply profile changes for a user.
    fn update(
        &self,
        user_id: &UserId,
        changes: &ProfileChanges,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// List every profile row.
    fn list(&self) -> impl Future<Output = Result<Vec<User>, RemoteError>> + Send;

    /// Create a profile row and return the stored profile.
    fn insert(
        &self,
        profile: &NewProfile,
    ) -> impl Future<Output = Result<User, RemoteError>> + Send;

    /// Delete a profile row by user id.
    fn delete(&self, user_id: &UserId) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

/// Turns an authenticated session into a typed [`User`].
pub struct IdentityResolver<P> {
    profiles: P,
}

impl<P: ProfileStore> IdentityResolver<P> {
    /// Create a resolver over a profile store.
    pub const fn new(profiles: P) -> Self {
        Self { profiles }
    }

    /// The underlying profile store, for directory-level operations.
    pub const fn profiles(&self) -> &P {
        &self.profiles
    }

    /// Resolve a session to its user profile.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::ProfileNotFound`] when the session's user has
    /// no profile row, and [`IdentityError::Remote`] when the store fails.
    pub async fn resolve(&self, session: &Session) -> Result<User, IdentityError> {
        let user_id = session.user_id();
        debug!(%user_id, "resolving session to profile");

        self.profiles
            .fetch(user_id)
            .await?
            .ok_or_else(|| IdentityError::ProfileNotFound(user_id.clone()))
    }

    /// Write profile changes and return the refreshed profile.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Remote`] on a failed write or re-read, and
    /// [`IdentityError::ProfileNotFound`] if the row vanished underneath us.
    pub async fn apply_changes(
        &self,
        session: &Session,
        changes: &ProfileChanges,
    ) -> Result<User, IdentityError> {
        if !changes.is_empty() {
            self.profiles.update(session.user_id(), changes).await?;
        }
        self.resolve(session).await
    }
}
