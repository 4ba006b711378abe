//! Application facade.
//!
//! Wires the navigation machine, the identity resolver, the catalog view
//! engine, and the mutation workflow together behind one type. The facade
//! owns all client-side state: who is signed in, which page is current, and
//! the last loaded asset collection with its freshness.
//!
//! The collection is explicit about degradation: a failed reload keeps the
//! last good assets and marks them [`CollectionOrigin::Stale`]; there is no
//! synthetic fallback data. Reloads are serialized through `&mut self`, so
//! the last completed load is always the one visible.

use thiserror::Error;
use tracing::{debug, info, warn};

use kv_library_core::{Asset, AssetDraft, AssetId, Email, Role, User, UserId};

use crate::admin::{AdminDirectory, ProfileOverview};
use crate::catalog::store::{AssetStore, ThumbnailStore};
use crate::catalog::workflow::{AssetWorkflow, Attachment, MutationError};
use crate::catalog::{self, CatalogFilter, CatalogStats};
use crate::error::RemoteError;
use crate::identity::{
    AuthError, IdentityError, IdentityGateway, IdentityResolver, NewProfile, ProfileChanges,
    ProfileStore, Session,
};
use crate::nav::{NavEvent, NavState, Page, Transition};

// ============================================================================
// Collection state
// ============================================================================

/// Where the current asset collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionOrigin {
    /// The most recent load succeeded.
    Live,
    /// A load succeeded earlier, but the most recent one failed.
    Stale,
    /// No load has ever succeeded.
    Unavailable,
}

/// The raw asset collection plus its freshness.
#[derive(Debug, Clone)]
pub struct Collection {
    pub assets: Vec<Asset>,
    pub origin: CollectionOrigin,
}

impl Default for Collection {
    fn default() -> Self {
        Self {
            assets: Vec::new(),
            origin: CollectionOrigin::Unavailable,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Why a sign-in attempt did not produce a signed-in user.
#[derive(Debug, Error)]
pub enum SignInError {
    /// The auth collaborator rejected the credentials or failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Authentication succeeded but the profile could not be resolved.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Why an admin operation did not happen.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The caller is not an admin.
    #[error("not authorized")]
    NotAuthorized,

    /// A store rejected the read or write.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Why a profile update did not happen.
#[derive(Debug, Error)]
pub enum ProfileUpdateError {
    /// There is no active session to update a profile for.
    #[error("not signed in")]
    NotSignedIn,

    /// The write or the refreshing read failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

// ============================================================================
// App
// ============================================================================

/// The client application: state machine, identity, and catalog in one.
///
/// Generic over its four collaborators so the whole surface is exercisable
/// with in-memory fakes.
pub struct App<I, P, A, T> {
    identity: I,
    resolver: IdentityResolver<P>,
    assets: A,
    thumbnails: T,
    nav: NavState,
    user: Option<User>,
    collection: Collection,
}

impl<I, P, A, T> App<I, P, A, T>
where
    I: IdentityGateway,
    P: ProfileStore,
    A: AssetStore,
    T: ThumbnailStore,
{
    /// Build the app over its collaborators, starting at the login page.
    pub fn new(identity: I, profiles: P, assets: A, thumbnails: T) -> Self {
        Self {
            identity,
            resolver: IdentityResolver::new(profiles),
            assets,
            thumbnails,
            nav: NavState::new(),
            user: None,
            collection: Collection::default(),
        }
    }

    // ------------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------------

    /// Resume a previously persisted session, if the gateway holds one.
    ///
    /// Without a session this is a no-op and the app stays on the login page.
    ///
    /// # Errors
    ///
    /// Propagates [`IdentityError::Remote`] when the profile store fails; a
    /// missing profile row is absorbed and leaves the app signed out.
    pub async fn bootstrap(&mut self) -> Result<(), IdentityError> {
        match self.identity.session() {
            Some(session) => self.handle_session_change(Some(session)).await,
            None => {
                debug!("no persisted session, staying on login");
                Ok(())
            }
        }
    }

    /// Exchange credentials for a session and resolve the signed-in user.
    ///
    /// On success the app moves to the dashboard and loads the collection.
    /// An initial load failure does not fail the sign-in; the collection is
    /// simply marked unavailable until a reload succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`SignInError::Auth`] on rejected credentials or a failing
    /// auth service, [`SignInError::Identity`] when the session resolves to
    /// no usable profile. Either way the app stays on the login page.
    pub async fn sign_in(&mut self, email: &Email, password: &str) -> Result<(), SignInError> {
        let session = self.identity.sign_in_with_password(email, password).await?;
        let user = self.resolver.resolve(&session).await?;
        info!(user_id = %user.id, role = %user.role, "signed in");

        self.nav.apply(NavEvent::SignedIn, user.role);
        self.user = Some(user);
        if let Err(error) = self.reload_assets().await {
            warn!(%error, "initial collection load failed");
        }
        Ok(())
    }

    /// Tear down the current session and return to the login page.
    ///
    /// Local state is cleared before the provider is told, so the app is
    /// signed out even when the logout request fails.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Service`] when the provider rejects the logout.
    pub async fn sign_out(&mut self) -> Result<(), AuthError> {
        self.clear_session_state();
        self.identity.sign_out().await
    }

    /// React to the session appearing, changing, or disappearing.
    ///
    /// `None` signs the app out unconditionally (expiry, logout elsewhere).
    /// `Some` resolves the session's profile; a missing profile row degrades
    /// to the signed-out state instead of erroring.
    ///
    /// # Errors
    ///
    /// Propagates [`IdentityError::Remote`] when the profile store fails.
    pub async fn handle_session_change(
        &mut self,
        session: Option<Session>,
    ) -> Result<(), IdentityError> {
        let Some(session) = session else {
            info!("session lost, signing out");
            self.clear_session_state();
            return Ok(());
        };

        match self.resolver.resolve(&session).await {
            Ok(user) => {
                info!(user_id = %user.id, "session resolved");
                self.nav.apply(NavEvent::SignedIn, user.role);
                self.user = Some(user);
                if let Err(error) = self.reload_assets().await {
                    warn!(%error, "collection load failed after session change");
                }
                Ok(())
            }
            Err(IdentityError::ProfileNotFound(user_id)) => {
                warn!(%user_id, "session has no profile, treating as signed out");
                self.clear_session_state();
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    fn clear_session_state(&mut self) {
        self.nav.apply(NavEvent::SessionLost, self.role());
        self.user = None;
        self.collection = Collection::default();
    }

    // ------------------------------------------------------------------------
    // Collection
    // ------------------------------------------------------------------------

    /// Reload the asset collection from the store.
    ///
    /// On failure the previous assets are kept and marked stale (or the
    /// collection stays unavailable if nothing was ever loaded).
    ///
    /// # Errors
    ///
    /// Returns the store's [`RemoteError`]; the degraded collection state is
    /// already recorded when this returns.
    pub async fn reload_assets(&mut self) -> Result<(), RemoteError> {
        match self.assets.list_newest_first().await {
            Ok(assets) => {
                debug!(count = assets.len(), "collection loaded");
                self.collection = Collection {
                    assets,
                    origin: CollectionOrigin::Live,
                };
                Ok(())
            }
            Err(error) => {
                if self.collection.origin != CollectionOrigin::Unavailable {
                    self.collection.origin = CollectionOrigin::Stale;
                }
                warn!(%error, origin = ?self.collection.origin, "collection reload failed");
                Err(error)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Go to the dashboard.
    pub fn go_home(&mut self) -> Transition {
        self.nav.apply(NavEvent::GoHome, self.role())
    }

    /// Open the input form for a new asset. Authors only.
    pub fn new_asset(&mut self) -> Transition {
        self.nav.apply(NavEvent::NewAsset, self.role())
    }

    /// Open the input form pre-filled with an asset from the collection.
    /// Authors only; an unknown id is blocked.
    pub fn edit_asset(&mut self, id: &AssetId) -> Transition {
        let role = self.role();
        match self.collection.assets.iter().find(|a| &a.id == id).cloned() {
            Some(asset) => self.nav.apply(NavEvent::EditAsset(asset), role),
            None => Transition::Blocked,
        }
    }

    /// Open the input form pre-filled with the selected asset. Authors only.
    pub fn edit_selected(&mut self) -> Transition {
        match self.nav.selected().cloned() {
            Some(asset) => self.nav.apply(NavEvent::EditAsset(asset), self.role()),
            None => Transition::Blocked,
        }
    }

    /// Open the details page for an asset in the current collection.
    ///
    /// An id that is no longer in the collection falls back to the
    /// dashboard instead of showing a dangling details page.
    pub fn view_details(&mut self, id: &AssetId) -> Transition {
        let role = self.role();
        match self.collection.assets.iter().find(|a| &a.id == id).cloned() {
            Some(asset) => self.nav.apply(NavEvent::ViewDetails(asset), role),
            None => {
                debug!(asset_id = %id, "asset not in collection, going home");
                self.nav.apply(NavEvent::GoHome, role)
            }
        }
    }

    /// Abandon the input form.
    pub fn cancel_form(&mut self) -> Transition {
        self.nav.apply(NavEvent::FormCancelled, self.role())
    }

    /// Open the admin panel. Admins only.
    pub fn open_admin(&mut self) -> Transition {
        self.nav.apply(NavEvent::OpenAdmin, self.role())
    }

    /// Open the profile page.
    pub fn open_profile(&mut self) -> Transition {
        self.nav.apply(NavEvent::OpenProfile, self.role())
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Submit the input form: create a new asset, or update the selected one.
    ///
    /// Only legal on the asset form; anywhere else this returns
    /// [`Transition::Blocked`] without touching anything. On success the
    /// collection is reloaded once and the app returns to the dashboard.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::Validation`] when required fields are missing
    /// (the form stays open for correction) and [`MutationError::Remote`]
    /// when a collaborator rejects the upload or write.
    pub async fn submit_asset(
        &mut self,
        draft: &AssetDraft,
        attachment: Option<Attachment>,
    ) -> Result<Transition, MutationError> {
        if self.page() != Page::AssetForm {
            return Ok(Transition::Blocked);
        }
        let author = self.identity.session().map(|s| s.user_id().clone());

        {
            let workflow = AssetWorkflow::new(&self.assets, &self.thumbnails);
            match self.nav.selected() {
                Some(existing) => {
                    workflow
                        .update(
                            &existing.id,
                            draft,
                            attachment,
                            &existing.thumbnail,
                            author.as_ref(),
                        )
                        .await?;
                }
                None => {
                    workflow.create(draft, attachment, author.as_ref()).await?;
                }
            }
        }

        if let Err(error) = self.reload_assets().await {
            warn!(%error, "reload after submit failed");
        }
        Ok(self.nav.apply(NavEvent::FormSubmitted, self.role()))
    }

    /// Delete the selected asset after confirmation on the details page.
    ///
    /// Only legal on the details page; anywhere else (the edit form also has
    /// a selection) this returns [`Transition::Blocked`] without touching
    /// anything. On success the collection is reloaded once and the app
    /// returns to the dashboard.
    ///
    /// # Errors
    ///
    /// Returns the store's [`RemoteError`], including access-control denial;
    /// the details page and selection stay as they were.
    pub async fn delete_selected(&mut self) -> Result<Transition, RemoteError> {
        if self.page() != Page::AssetDetails {
            return Ok(Transition::Blocked);
        }
        let Some(id) = self.nav.selected().map(|a| a.id.clone()) else {
            return Ok(Transition::Blocked);
        };

        AssetWorkflow::new(&self.assets, &self.thumbnails)
            .delete(&id)
            .await?;
        if let Err(error) = self.reload_assets().await {
            warn!(%error, "reload after delete failed");
        }
        Ok(self.nav.apply(NavEvent::DeleteConfirmed, self.role()))
    }

    /// Write profile changes for the signed-in user and refresh the profile.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileUpdateError::NotSignedIn`] without a session, and
    /// [`ProfileUpdateError::Identity`] when the store fails.
    pub async fn update_profile(
        &mut self,
        changes: &ProfileChanges,
    ) -> Result<(), ProfileUpdateError> {
        let session = self
            .identity
            .session()
            .ok_or(ProfileUpdateError::NotSignedIn)?;

        let user = self.resolver.apply_changes(&session, changes).await?;
        info!(user_id = %user.id, "profile updated");
        self.user = Some(user);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------------

    fn admin_directory(&self) -> Result<AdminDirectory<'_, P, A>, AdminError> {
        if !self.role().is_admin() {
            return Err(AdminError::NotAuthorized);
        }
        Ok(AdminDirectory::new(self.resolver.profiles(), &self.assets))
    }

    /// Every profile with its authored-asset count. Admins only.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotAuthorized`] for non-admin callers and
    /// [`AdminError::Remote`] when a store fails the read.
    pub async fn admin_overview(&self) -> Result<Vec<ProfileOverview>, AdminError> {
        Ok(self.admin_directory()?.overview().await?)
    }

    /// Create a profile row for a new user. Admins only.
    ///
    /// The row alone does not let the user sign in; their identity record
    /// is provisioned separately at the auth provider.
    ///
    /// # Errors
    ///
    /// Same authorization contract as [`Self::admin_overview`]; store-side
    /// access-control denial surfaces as `Remote(Denied)`.
    pub async fn admin_create_profile(&self, profile: &NewProfile) -> Result<User, AdminError> {
        Ok(self.admin_directory()?.create_profile(profile).await?)
    }

    /// Delete a profile row. Admins only.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::admin_create_profile`].
    pub async fn admin_delete_profile(&self, user_id: &UserId) -> Result<(), AdminError> {
        Ok(self.admin_directory()?.delete_profile(user_id).await?)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// The page to render.
    #[must_use]
    pub fn page(&self) -> Page {
        self.nav.current()
    }

    /// The asset selected on the details page or the form in edit mode.
    #[must_use]
    pub fn selected(&self) -> Option<&Asset> {
        self.nav.selected()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The effective role; unauthenticated viewers act as guests.
    #[must_use]
    pub fn role(&self) -> Role {
        self.user.as_ref().map_or(Role::Guest, |u| u.role)
    }

    /// The raw collection with its freshness.
    #[must_use]
    pub const fn collection(&self) -> &Collection {
        &self.collection
    }

    /// The filtered, newest-first view of the collection.
    #[must_use]
    pub fn filtered_view(&self, filter: &CatalogFilter) -> Vec<Asset> {
        catalog::filtered_view(&self.collection.assets, filter)
    }

    /// Dashboard statistics over the full raw collection.
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        CatalogStats::compute(&self.collection.assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use chrono::{TimeZone, Utc};
    use secrecy::SecretString;

    use kv_library_core::{CampaignType, Category, UserId, UserStatus};

    use crate::catalog::store::AssetRecord;

    // Fakes share state through Arc so tests can inspect them after handing
    // ownership to the app.

    #[derive(Clone, Default)]
    struct FakeIdentity {
        session: Arc<Mutex<Option<Session>>>,
        valid_password: String,
        user_id: String,
    }

    impl FakeIdentity {
        fn with_account(user_id: &str, password: &str) -> Self {
            Self {
                session: Arc::new(Mutex::new(None)),
                valid_password: password.to_owned(),
                user_id: user_id.to_owned(),
            }
        }
    }

    impl IdentityGateway for FakeIdentity {
        fn session(&self) -> Option<Session> {
            self.session.lock().expect("lock").clone()
        }

        async fn sign_in_with_password(
            &self,
            _email: &Email,
            password: &str,
        ) -> Result<Session, AuthError> {
            if password != self.valid_password {
                return Err(AuthError::InvalidCredentials);
            }
            let session = Session::new(UserId::new(&self.user_id), SecretString::from("token"));
            *self.session.lock().expect("lock") = Some(session.clone());
            Ok(session)
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            *self.session.lock().expect("lock") = None;
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct FakeProfiles {
        rows: Arc<Mutex<HashMap<UserId, User>>>,
    }

    impl FakeProfiles {
        fn with_user(user: User) -> Self {
            let profiles = Self::default();
            profiles
                .rows
                .lock()
                .expect("lock")
                .insert(user.id.clone(), user);
            profiles
        }
    }

    impl ProfileStore for FakeProfiles {
        async fn fetch(&self, user_id: &UserId) -> Result<Option<User>, RemoteError> {
            Ok(self.rows.lock().expect("lock").get(user_id).cloned())
        }

        async fn update(
            &self,
            user_id: &UserId,
            changes: &ProfileChanges,
        ) -> Result<(), RemoteError> {
            let mut rows = self.rows.lock().expect("lock");
            let user = rows
                .get_mut(user_id)
                .ok_or_else(|| RemoteError::Malformed("no row".to_owned()))?;
            if let Some(name) = &changes.name {
                user.name.clone_from(name);
            }
            if let Some(avatar) = &changes.avatar {
                user.avatar.clone_from(avatar);
            }
            Ok(())
        }

        async fn list(&self) -> Result<Vec<User>, RemoteError> {
            Ok(self.rows.lock().expect("lock").values().cloned().collect())
        }

        async fn insert(&self, profile: &NewProfile) -> Result<User, RemoteError> {
            let mut rows = self.rows.lock().expect("lock");
            let user = User {
                id: UserId::new(format!("u-{}", rows.len() + 1)),
                name: profile.name.clone(),
                email: profile.email.clone(),
                role: profile.role,
                status: UserStatus::Active,
                last_active: String::new(),
                avatar: String::new(),
            };
            rows.insert(user.id.clone(), user.clone());
            Ok(user)
        }

        async fn delete(&self, user_id: &UserId) -> Result<(), RemoteError> {
            self.rows.lock().expect("lock").remove(user_id);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct FakeAssets {
        rows: Arc<Mutex<Vec<Asset>>>,
        loads: Arc<AtomicUsize>,
        fail_loads: Arc<Mutex<bool>>,
        next_id: Arc<AtomicUsize>,
    }

    impl FakeAssets {
        fn seeded(assets: Vec<Asset>) -> Self {
            let fake = Self::default();
            *fake.rows.lock().expect("lock") = assets;
            fake
        }

        fn set_failing(&self, failing: bool) {
            *self.fail_loads.lock().expect("lock") = failing;
        }
    }

    impl AssetStore for FakeAssets {
        async fn list_newest_first(&self) -> Result<Vec<Asset>, RemoteError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if *self.fail_loads.lock().expect("lock") {
                return Err(RemoteError::Api {
                    status: 503,
                    message: "down".to_owned(),
                });
            }
            Ok(self.rows.lock().expect("lock").clone())
        }

        async fn insert(&self, record: &AssetRecord) -> Result<AssetId, RemoteError> {
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            let id = AssetId::new(format!("kv-{n}"));
            self.rows.lock().expect("lock").push(Asset {
                id: id.clone(),
                name: record.name.clone(),
                campaign_type: record.campaign_type,
                category: record.category,
                uploaded_date: record.uploaded_date.format("%Y-%m-%d").to_string(),
                created_at: Some(record.uploaded_date),
                thumbnail: record.thumbnail.clone(),
                source: record.source.clone(),
                drive_link: record.drive_link.clone(),
                user_id: record.user_id.clone(),
            });
            Ok(id)
        }

        async fn update(&self, id: &AssetId, record: &AssetRecord) -> Result<(), RemoteError> {
            let mut rows = self.rows.lock().expect("lock");
            let asset = rows
                .iter_mut()
                .find(|a| &a.id == id)
                .ok_or_else(|| RemoteError::Malformed("no row".to_owned()))?;
            asset.name.clone_from(&record.name);
            asset.thumbnail.clone_from(&record.thumbnail);
            Ok(())
        }

        async fn delete(&self, id: &AssetId) -> Result<(), RemoteError> {
            self.rows.lock().expect("lock").retain(|a| &a.id != id);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct FakeBucket;

    impl ThumbnailStore for FakeBucket {
        async fn upload(
            &self,
            _key: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<(), RemoteError> {
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("https://cdn.test/{key}")
        }
    }

    fn user(role: Role) -> User {
        User {
            id: UserId::new("u-1"),
            name: "Sari".to_owned(),
            email: Email::parse("sari@example.com").expect("email"),
            role,
            status: UserStatus::Active,
            last_active: "2025-06-01".to_owned(),
            avatar: String::new(),
        }
    }

    fn asset(id: &str, day: u32) -> Asset {
        Asset {
            id: AssetId::new(id),
            name: format!("KV {id}"),
            campaign_type: CampaignType::Digital,
            category: Category::Mobile,
            uploaded_date: format!("2025-03-{day:02}"),
            created_at: Utc.with_ymd_and_hms(2025, 3, day, 0, 0, 0).single(),
            thumbnail: String::new(),
            source: "HQ".to_owned(),
            drive_link: String::new(),
            user_id: None,
        }
    }

    fn app_for(
        role: Role,
        assets: FakeAssets,
    ) -> App<FakeIdentity, FakeProfiles, FakeAssets, FakeBucket> {
        App::new(
            FakeIdentity::with_account("u-1", "hunter2"),
            FakeProfiles::with_user(user(role)),
            assets,
            FakeBucket,
        )
    }

    async fn signed_in(
        role: Role,
        assets: FakeAssets,
    ) -> App<FakeIdentity, FakeProfiles, FakeAssets, FakeBucket> {
        let mut app = app_for(role, assets);
        let email = Email::parse("sari@example.com").expect("email");
        app.sign_in(&email, "hunter2").await.expect("sign in");
        app
    }

    fn complete_draft() -> AssetDraft {
        AssetDraft {
            name: "KV Lebaran".to_owned(),
            campaign_type: Some(CampaignType::Digital),
            category: Some(Category::Mobile),
            source: "HQ".to_owned(),
            uploaded_date: "2025-04-01".to_owned(),
            drive_link: String::new(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_loads_collection_and_moves_to_dashboard() {
        let assets = FakeAssets::seeded(vec![asset("kv-a", 1), asset("kv-b", 2)]);
        let app = signed_in(Role::Editor, assets.clone()).await;

        assert_eq!(app.page(), Page::Dashboard);
        assert_eq!(app.role(), Role::Editor);
        assert_eq!(app.collection().origin, CollectionOrigin::Live);
        assert_eq!(app.collection().assets.len(), 2);
        assert_eq!(assets.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sign_in_rejected_stays_on_login() {
        let mut app = app_for(Role::Editor, FakeAssets::default());
        let email = Email::parse("sari@example.com").expect("email");

        let err = app.sign_in(&email, "wrong").await.expect_err("must fail");
        assert!(matches!(err, SignInError::Auth(AuthError::InvalidCredentials)));
        assert_eq!(app.page(), Page::Login);
        assert!(app.user().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_without_profile_fails_resolution() {
        let mut app = App::new(
            FakeIdentity::with_account("ghost", "hunter2"),
            FakeProfiles::default(),
            FakeAssets::default(),
            FakeBucket,
        );
        let email = Email::parse("ghost@example.com").expect("email");

        let err = app.sign_in(&email, "hunter2").await.expect_err("must fail");
        assert!(matches!(
            err,
            SignInError::Identity(IdentityError::ProfileNotFound(_))
        ));
        assert_eq!(app.page(), Page::Login);
    }

    #[tokio::test]
    async fn test_bootstrap_resumes_persisted_session() {
        let identity = FakeIdentity::with_account("u-1", "hunter2");
        *identity.session.lock().expect("lock") = Some(Session::new(
            UserId::new("u-1"),
            SecretString::from("persisted"),
        ));
        let mut app = App::new(
            identity,
            FakeProfiles::with_user(user(Role::Admin)),
            FakeAssets::seeded(vec![asset("kv-a", 1)]),
            FakeBucket,
        );

        app.bootstrap().await.expect("bootstrap");
        assert_eq!(app.page(), Page::Dashboard);
        assert_eq!(app.role(), Role::Admin);
        assert_eq!(app.collection().origin, CollectionOrigin::Live);
    }

    #[tokio::test]
    async fn test_bootstrap_without_session_is_noop() {
        let assets = FakeAssets::default();
        let mut app = app_for(Role::Editor, assets.clone());

        app.bootstrap().await.expect("bootstrap");
        assert_eq!(app.page(), Page::Login);
        assert_eq!(assets.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_guest_cannot_reach_asset_form() {
        let mut app = signed_in(Role::Guest, FakeAssets::default()).await;

        assert_eq!(app.new_asset(), Transition::Blocked);
        assert_eq!(app.page(), Page::Dashboard);
        assert_eq!(app.open_admin(), Transition::Blocked);
    }

    #[tokio::test]
    async fn test_failed_reload_marks_collection_stale() {
        let assets = FakeAssets::seeded(vec![asset("kv-a", 1)]);
        let mut app = signed_in(Role::Editor, assets.clone()).await;

        assets.set_failing(true);
        app.reload_assets().await.expect_err("must fail");

        assert_eq!(app.collection().origin, CollectionOrigin::Stale);
        // The stale data is still the last good load.
        assert_eq!(app.collection().assets.len(), 1);
    }

    #[tokio::test]
    async fn test_collection_unavailable_when_never_loaded() {
        let assets = FakeAssets::default();
        assets.set_failing(true);
        let app = signed_in(Role::Editor, assets).await;

        assert_eq!(app.collection().origin, CollectionOrigin::Unavailable);
        assert!(app.collection().assets.is_empty());
    }

    #[tokio::test]
    async fn test_submit_creates_asset_and_reloads_once() {
        let assets = FakeAssets::default();
        let mut app = signed_in(Role::Editor, assets.clone()).await;
        app.new_asset();
        let loads_before = assets.loads.load(Ordering::SeqCst);

        let transition = app
            .submit_asset(&complete_draft(), None)
            .await
            .expect("submit");

        assert_eq!(transition, Transition::Moved(Page::Dashboard));
        assert_eq!(assets.loads.load(Ordering::SeqCst), loads_before + 1);
        assert_eq!(app.collection().assets.len(), 1);
        assert_eq!(app.collection().assets[0].name, "KV Lebaran");
    }

    #[tokio::test]
    async fn test_submit_outside_form_is_blocked() {
        let assets = FakeAssets::default();
        let mut app = signed_in(Role::Editor, assets.clone()).await;
        let loads_before = assets.loads.load(Ordering::SeqCst);

        let transition = app
            .submit_asset(&complete_draft(), None)
            .await
            .expect("no-op");
        assert_eq!(transition, Transition::Blocked);
        assert_eq!(assets.loads.load(Ordering::SeqCst), loads_before);
        assert!(app.collection().assets.is_empty());
    }

    #[tokio::test]
    async fn test_submit_invalid_draft_keeps_form_open() {
        let mut app = signed_in(Role::Editor, FakeAssets::default()).await;
        app.new_asset();

        let mut draft = complete_draft();
        draft.name = String::new();
        let err = app.submit_asset(&draft, None).await.expect_err("must fail");
        assert!(matches!(err, MutationError::Validation(_)));
        assert_eq!(app.page(), Page::AssetForm);
    }

    #[tokio::test]
    async fn test_submit_in_edit_mode_updates_selected() {
        let assets = FakeAssets::seeded(vec![asset("kv-a", 1)]);
        let mut app = signed_in(Role::Editor, assets).await;
        app.view_details(&AssetId::new("kv-a"));
        app.edit_selected();
        assert_eq!(app.page(), Page::AssetForm);

        let mut draft = complete_draft();
        draft.name = "KV Renamed".to_owned();
        app.submit_asset(&draft, None).await.expect("submit");

        assert_eq!(app.page(), Page::Dashboard);
        assert_eq!(app.collection().assets[0].name, "KV Renamed");
        // Update without a new attachment keeps one row, not an extra insert.
        assert_eq!(app.collection().assets.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_selected_removes_and_returns_home() {
        let assets = FakeAssets::seeded(vec![asset("kv-a", 1), asset("kv-b", 2)]);
        let mut app = signed_in(Role::Admin, assets).await;
        app.view_details(&AssetId::new("kv-a"));

        let transition = app.delete_selected().await.expect("delete");
        assert_eq!(transition, Transition::Moved(Page::Dashboard));
        assert_eq!(app.collection().assets.len(), 1);
        assert_eq!(app.collection().assets[0].id.as_str(), "kv-b");
        assert!(app.selected().is_none());
    }

    #[tokio::test]
    async fn test_delete_without_selection_is_blocked() {
        let mut app = signed_in(Role::Admin, FakeAssets::default()).await;
        let transition = app.delete_selected().await.expect("no-op");
        assert_eq!(transition, Transition::Blocked);
    }

    #[tokio::test]
    async fn test_delete_from_edit_form_is_blocked() {
        let assets = FakeAssets::seeded(vec![asset("kv-a", 1)]);
        let mut app = signed_in(Role::Editor, assets).await;
        app.view_details(&AssetId::new("kv-a"));
        app.edit_selected();
        assert_eq!(app.page(), Page::AssetForm);

        // The form has a selection too, but delete only confirms on details.
        let transition = app.delete_selected().await.expect("no-op");
        assert_eq!(transition, Transition::Blocked);
        assert_eq!(app.page(), Page::AssetForm);
        assert_eq!(app.collection().assets.len(), 1);
    }

    #[tokio::test]
    async fn test_edit_asset_resolves_from_collection() {
        let assets = FakeAssets::seeded(vec![asset("kv-a", 1)]);
        let mut app = signed_in(Role::Editor, assets).await;

        assert_eq!(
            app.edit_asset(&AssetId::new("kv-a")),
            Transition::Moved(Page::AssetForm)
        );
        assert_eq!(app.selected().map(|a| a.id.as_str()), Some("kv-a"));

        app.go_home();
        assert_eq!(app.edit_asset(&AssetId::new("gone")), Transition::Blocked);
        assert_eq!(app.page(), Page::Dashboard);
    }

    #[tokio::test]
    async fn test_view_details_of_missing_asset_falls_back_home() {
        let mut app = signed_in(Role::Editor, FakeAssets::default()).await;

        let transition = app.view_details(&AssetId::new("gone"));
        assert_eq!(transition, Transition::Moved(Page::Dashboard));
        assert!(app.selected().is_none());
    }

    #[tokio::test]
    async fn test_session_loss_clears_everything() {
        let assets = FakeAssets::seeded(vec![asset("kv-a", 1)]);
        let mut app = signed_in(Role::Editor, assets).await;
        app.new_asset();
        assert_eq!(app.page(), Page::AssetForm);

        app.handle_session_change(None).await.expect("sign out");
        assert_eq!(app.page(), Page::Login);
        assert!(app.user().is_none());
        assert_eq!(app.collection().origin, CollectionOrigin::Unavailable);
        assert!(app.collection().assets.is_empty());
    }

    #[tokio::test]
    async fn test_sign_out_clears_state_locally() {
        let mut app = signed_in(Role::Editor, FakeAssets::default()).await;
        app.sign_out().await.expect("sign out");

        assert_eq!(app.page(), Page::Login);
        assert!(app.user().is_none());
        assert_eq!(app.role(), Role::Guest);
    }

    #[tokio::test]
    async fn test_update_profile_requires_session() {
        let mut app = app_for(Role::Editor, FakeAssets::default());
        let err = app
            .update_profile(&ProfileChanges {
                name: Some("New".to_owned()),
                avatar: None,
            })
            .await
            .expect_err("must fail");
        assert!(matches!(err, ProfileUpdateError::NotSignedIn));
    }

    #[tokio::test]
    async fn test_update_profile_refreshes_user() {
        let mut app = signed_in(Role::Editor, FakeAssets::default()).await;

        app.update_profile(&ProfileChanges {
            name: Some("Sari W.".to_owned()),
            avatar: None,
        })
        .await
        .expect("update");

        assert_eq!(app.user().map(|u| u.name.as_str()), Some("Sari W."));
    }

    #[tokio::test]
    async fn test_admin_overview_counts_authored_assets() {
        let mut authored = asset("kv-a", 1);
        authored.user_id = Some(UserId::new("u-1"));
        let assets = FakeAssets::seeded(vec![authored, asset("kv-b", 2)]);
        let app = signed_in(Role::Admin, assets).await;

        let overview = app.admin_overview().await.expect("overview");
        assert_eq!(overview.len(), 1);
        assert_eq!(overview[0].user.id.as_str(), "u-1");
        assert_eq!(overview[0].asset_count, 1);
    }

    #[tokio::test]
    async fn test_admin_operations_require_admin_role() {
        let app = signed_in(Role::Editor, FakeAssets::default()).await;

        let err = app.admin_overview().await.expect_err("must fail");
        assert!(matches!(err, AdminError::NotAuthorized));

        let err = app
            .admin_delete_profile(&UserId::new("u-1"))
            .await
            .expect_err("must fail");
        assert!(matches!(err, AdminError::NotAuthorized));
    }

    #[tokio::test]
    async fn test_admin_creates_and_deletes_profiles() {
        let app = signed_in(Role::Admin, FakeAssets::default()).await;

        let created = app
            .admin_create_profile(&NewProfile {
                name: "Budi".to_owned(),
                email: Email::parse("budi@example.com").expect("email"),
                role: Role::Editor,
            })
            .await
            .expect("create");
        assert_eq!(created.role, Role::Editor);
        assert_eq!(app.admin_overview().await.expect("overview").len(), 2);

        app.admin_delete_profile(&created.id).await.expect("delete");
        let overview = app.admin_overview().await.expect("overview");
        assert_eq!(overview.len(), 1);
        assert_eq!(overview[0].user.id.as_str(), "u-1");
    }

    #[tokio::test]
    async fn test_stats_and_view_read_the_collection() {
        let assets = FakeAssets::seeded(vec![asset("kv-a", 1), asset("kv-b", 2)]);
        let app = signed_in(Role::Guest, assets).await;

        let stats = app.stats();
        assert_eq!(stats.total, 2);

        let filter = CatalogFilter {
            query: Some("kv-b".to_owned()),
            ..CatalogFilter::default()
        };
        let view = app.filtered_view(&filter);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id.as_str(), "kv-b");
    }
}
