//! Integration tests for the KV library client.
//!
//! The full application core is exercised in-process against in-memory
//! collaborators implementing the same contracts the Supabase clients do:
//! an identity gateway with seeded accounts, a profile table, an asset
//! table, and a thumbnail bucket. No network, no real backend.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kv-library-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use secrecy::SecretString;
use uuid::Uuid;

use kv_library_client::app::App;
use kv_library_client::catalog::store::{AssetRecord, AssetStore, ThumbnailStore};
use kv_library_client::error::RemoteError;
use kv_library_client::identity::{
    AuthError, IdentityGateway, NewProfile, ProfileChanges, ProfileStore, Session,
};
use kv_library_core::{
    Asset, AssetDraft, AssetId, CampaignType, Category, Email, Role, User, UserId, UserStatus,
};

// ============================================================================
// In-memory collaborators
// ============================================================================

/// Identity gateway with seeded email/password accounts.
#[derive(Clone, Default)]
pub struct InMemoryIdentity {
    accounts: Arc<Mutex<HashMap<String, (String, UserId)>>>,
    session: Arc<Mutex<Option<Session>>>,
}

impl InMemoryIdentity {
    pub fn add_account(&self, email: &str, password: &str, user_id: &str) {
        self.accounts.lock().expect("lock").insert(
            email.to_owned(),
            (password.to_owned(), UserId::new(user_id)),
        );
    }

    /// Inject a session as if it had been persisted from an earlier run.
    pub fn persist_session(&self, user_id: &str) {
        *self.session.lock().expect("lock") = Some(Session::new(
            UserId::new(user_id),
            SecretString::from("persisted-token"),
        ));
    }

    pub fn has_session(&self) -> bool {
        self.session.lock().expect("lock").is_some()
    }
}

impl IdentityGateway for InMemoryIdentity {
    fn session(&self) -> Option<Session> {
        self.session.lock().expect("lock").clone()
    }

    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Session, AuthError> {
        let accounts = self.accounts.lock().expect("lock");
        let Some((expected, user_id)) = accounts.get(email.as_str()) else {
            return Err(AuthError::InvalidCredentials);
        };
        if expected != password {
            return Err(AuthError::InvalidCredentials);
        }
        let session = Session::new(user_id.clone(), SecretString::from("test-token"));
        drop(accounts);
        *self.session.lock().expect("lock") = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.session.lock().expect("lock") = None;
        Ok(())
    }
}

/// The `profiles` table, with a switch for denied writes.
#[derive(Clone, Default)]
pub struct InMemoryProfiles {
    rows: Arc<Mutex<HashMap<UserId, User>>>,
    deny_writes: Arc<Mutex<bool>>,
}

impl InMemoryProfiles {
    pub fn add(&self, user: User) {
        self.rows.lock().expect("lock").insert(user.id.clone(), user);
    }

    /// Simulate row-level security rejecting inserts and deletes.
    pub fn set_denying_writes(&self, denying: bool) {
        *self.deny_writes.lock().expect("lock") = denying;
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().expect("lock").len()
    }

    fn check_writable(&self) -> Result<(), RemoteError> {
        if *self.deny_writes.lock().expect("lock") {
            return Err(RemoteError::Denied(
                "new row violates row-level security policy".to_owned(),
            ));
        }
        Ok(())
    }
}

impl ProfileStore for InMemoryProfiles {
    async fn fetch(&self, user_id: &UserId) -> Result<Option<User>, RemoteError> {
        Ok(self.rows.lock().expect("lock").get(user_id).cloned())
    }

    async fn update(&self, user_id: &UserId, changes: &ProfileChanges) -> Result<(), RemoteError> {
        let mut rows = self.rows.lock().expect("lock");
        let user = rows
            .get_mut(user_id)
            .ok_or_else(|| RemoteError::Malformed("no profile row".to_owned()))?;
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
        self.check_writable()?;
        let user = User {
            id: UserId::new(Uuid::new_v4().to_string()),
            name: profile.name.clone(),
            email: profile.email.clone(),
            role: profile.role,
            status: UserStatus::Active,
            last_active: String::new(),
            avatar: String::new(),
        };
        self.rows
            .lock()
            .expect("lock")
            .insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), RemoteError> {
        self.check_writable()?;
        self.rows.lock().expect("lock").remove(user_id);
        Ok(())
    }
}

/// The `kv_assets` table, with switches for outages and denied writes.
#[derive(Clone, Default)]
pub struct InMemoryAssets {
    rows: Arc<Mutex<Vec<Asset>>>,
    loads: Arc<AtomicUsize>,
    fail_loads: Arc<Mutex<bool>>,
    deny_writes: Arc<Mutex<bool>>,
}

impl InMemoryAssets {
    pub fn seed(&self, asset: Asset) {
        self.rows.lock().expect("lock").push(asset);
    }

    /// Simulate the backend being unreachable for reads.
    pub fn set_failing(&self, failing: bool) {
        *self.fail_loads.lock().expect("lock") = failing;
    }

    /// Simulate row-level security rejecting writes.
    pub fn set_denying_writes(&self, denying: bool) {
        *self.deny_writes.lock().expect("lock") = denying;
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().expect("lock").len()
    }

    fn check_writable(&self) -> Result<(), RemoteError> {
        if *self.deny_writes.lock().expect("lock") {
            return Err(RemoteError::Denied(
                "new row violates row-level security policy".to_owned(),
            ));
        }
        Ok(())
    }
}

impl AssetStore for InMemoryAssets {
    async fn list_newest_first(&self) -> Result<Vec<Asset>, RemoteError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if *self.fail_loads.lock().expect("lock") {
            return Err(RemoteError::Api {
                status: 503,
                message: "service unavailable".to_owned(),
            });
        }
        Ok(self.rows.lock().expect("lock").clone())
    }

    async fn insert(&self, record: &AssetRecord) -> Result<AssetId, RemoteError> {
        self.check_writable()?;
        let id = AssetId::new(Uuid::new_v4().to_string());
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
        self.check_writable()?;
        let mut rows = self.rows.lock().expect("lock");
        let asset = rows
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| RemoteError::Malformed("no asset row".to_owned()))?;
        asset.name.clone_from(&record.name);
        asset.campaign_type = record.campaign_type;
        asset.category = record.category;
        asset.source.clone_from(&record.source);
        asset.thumbnail.clone_from(&record.thumbnail);
        asset.drive_link.clone_from(&record.drive_link);
        Ok(())
    }

    async fn delete(&self, id: &AssetId) -> Result<(), RemoteError> {
        self.check_writable()?;
        self.rows.lock().expect("lock").retain(|a| &a.id != id);
        Ok(())
    }
}

/// The thumbnail bucket.
#[derive(Clone, Default)]
pub struct InMemoryBucket {
    uploads: Arc<Mutex<Vec<String>>>,
    fail_uploads: Arc<Mutex<bool>>,
}

impl InMemoryBucket {
    pub fn set_failing(&self, failing: bool) {
        *self.fail_uploads.lock().expect("lock") = failing;
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().expect("lock").len()
    }
}

impl ThumbnailStore for InMemoryBucket {
    async fn upload(
        &self,
        key: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), RemoteError> {
        if *self.fail_uploads.lock().expect("lock") {
            return Err(RemoteError::Api {
                status: 500,
                message: "bucket unavailable".to_owned(),
            });
        }
        self.uploads.lock().expect("lock").push(key.to_owned());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://cdn.test/thumbnails/{key}")
    }
}

// ============================================================================
// Test harness
// ============================================================================

pub type TestApp = App<InMemoryIdentity, InMemoryProfiles, InMemoryAssets, InMemoryBucket>;

/// One in-memory backend shared by a test and the app under test.
///
/// The collaborators are handles over shared state, so the test can keep
/// inspecting (and perturbing) the backend after handing clones to the app.
#[derive(Clone, Default)]
pub struct Backend {
    pub identity: InMemoryIdentity,
    pub profiles: InMemoryProfiles,
    pub assets: InMemoryAssets,
    pub bucket: InMemoryBucket,
}

impl Backend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an auth account together with its profile row.
    pub fn add_user(&self, email: &str, password: &str, user: User) {
        self.identity.add_account(email, password, user.id.as_str());
        self.profiles.add(user);
    }

    #[must_use]
    pub fn app(&self) -> TestApp {
        App::new(
            self.identity.clone(),
            self.profiles.clone(),
            self.assets.clone(),
            self.bucket.clone(),
        )
    }

    /// Build an app and sign in with previously seeded credentials.
    pub async fn signed_in_app(&self, email: &str, password: &str) -> TestApp {
        let mut app = self.app();
        let email = Email::parse(email).expect("valid test email");
        app.sign_in(&email, password).await.expect("sign in");
        app
    }
}

// ============================================================================
// Fixtures
// ============================================================================

#[must_use]
pub fn user(id: &str, name: &str, email: &str, role: Role) -> User {
    User {
        id: UserId::new(id),
        name: name.to_owned(),
        email: Email::parse(email).expect("valid test email"),
        role,
        status: UserStatus::Active,
        last_active: "2025-06-01".to_owned(),
        avatar: String::new(),
    }
}

/// An asset created on the given day of March 2025; later day means newer.
#[must_use]
pub fn asset(id: &str, name: &str, day: u32) -> Asset {
    Asset {
        id: AssetId::new(id),
        name: name.to_owned(),
        campaign_type: CampaignType::Digital,
        category: Category::Mobile,
        uploaded_date: format!("2025-03-{day:02}"),
        created_at: Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).single(),
        thumbnail: String::new(),
        source: "HQ".to_owned(),
        drive_link: String::new(),
        user_id: None,
    }
}

/// A draft with every required field filled in.
#[must_use]
pub fn complete_draft(name: &str) -> AssetDraft {
    AssetDraft {
        name: name.to_owned(),
        campaign_type: Some(CampaignType::Digital),
        category: Some(Category::Mobile),
        source: "HQ".to_owned(),
        uploaded_date: "2025-04-01".to_owned(),
        drive_link: "https://drive.example.com/kv".to_owned(),
    }
}
