//! Admin directory: profile management and per-user asset counts.
//!
//! Backs the admin panel. The overview joins the profile table with the
//! asset table's author column client-side; create and delete go straight
//! to the profile store, whose access control decides whether the caller
//! may write (denials surface as `Denied`). A created profile cannot sign
//! in until its identity record exists at the auth provider; see the
//! [`crate::identity`] module notes.

use std::collections::HashMap;

use tracing::info;

use kv_library_core::{User, UserId};

use crate::catalog::store::AssetStore;
use crate::error::RemoteError;
use crate::identity::{NewProfile, ProfileStore};

/// A profile row together with how many assets its user authored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileOverview {
    pub user: User,
    /// Assets carrying this user's id as author. Unattributed assets count
    /// for nobody.
    pub asset_count: usize,
}

/// Profile management over the profile and asset stores.
pub struct AdminDirectory<'a, P, A> {
    profiles: &'a P,
    assets: &'a A,
}

impl<'a, P: ProfileStore, A: AssetStore> AdminDirectory<'a, P, A> {
    /// Create a directory over the two collaborators.
    #[must_use]
    pub const fn new(profiles: &'a P, assets: &'a A) -> Self {
        Self { profiles, assets }
    }

    /// Every profile with its authored-asset count.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when either store fails the read.
    pub async fn overview(&self) -> Result<Vec<ProfileOverview>, RemoteError> {
        let users = self.profiles.list().await?;
        let assets = self.assets.list_newest_first().await?;

        let mut counts: HashMap<&UserId, usize> = HashMap::new();
        for asset in &assets {
            if let Some(author) = &asset.user_id {
                *counts.entry(author).or_insert(0) += 1;
            }
        }

        Ok(users
            .into_iter()
            .map(|user| {
                let asset_count = counts.get(&user.id).copied().unwrap_or(0);
                ProfileOverview { user, asset_count }
            })
            .collect())
    }

    /// Create a profile row for a new user.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`], including `Denied` when the store's access
    /// control rejects the caller.
    pub async fn create_profile(&self, profile: &NewProfile) -> Result<User, RemoteError> {
        let user = self.profiles.insert(profile).await?;
        info!(user_id = %user.id, role = %user.role, "profile created");
        Ok(user)
    }

    /// Delete a profile row by user id.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::create_profile`].
    pub async fn delete_profile(&self, user_id: &UserId) -> Result<(), RemoteError> {
        self.profiles.delete(user_id).await?;
        info!(%user_id, "profile deleted");
        Ok(())
    }
}
