//! Navigation state machine.
//!
//! Owns the current page and the selected asset, and decides which
//! transitions are legal for which role. Authorization lives here as guard
//! predicates, not in the presentation layer: a blocked transition returns
//! [`Transition::Blocked`] and leaves the state untouched, so the gates are
//! testable without rendering anything.
//!
//! The machine is a persistent UI loop: initial state is [`Page::Login`]
//! and there is no terminal state.

use serde::{Deserialize, Serialize};
use tracing::debug;

use kv_library_core::{Asset, Role};

/// The pages of the application. Exactly one is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Page {
    Login,
    Dashboard,
    AdminPanel,
    AssetForm,
    AssetDetails,
    Profile,
}

/// A user action or system signal that may move the machine.
#[derive(Debug, Clone)]
pub enum NavEvent {
    /// Identity resolution succeeded.
    SignedIn,
    /// "Go home" from anywhere.
    GoHome,
    /// Open the input form for a new asset.
    NewAsset,
    /// Open the input form pre-filled with an existing asset.
    EditAsset(Asset),
    /// Open the details page for an asset.
    ViewDetails(Asset),
    /// The form was submitted and the mutation succeeded.
    FormSubmitted,
    /// The form was abandoned.
    FormCancelled,
    /// The details page's delete was confirmed and succeeded.
    DeleteConfirmed,
    /// Open the admin panel.
    OpenAdmin,
    /// Open the profile page.
    OpenProfile,
    /// The session disappeared (logout, expiry, login elsewhere).
    SessionLost,
}

/// Outcome of applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The machine moved to this page.
    Moved(Page),
    /// A guard rejected the event; nothing changed.
    Blocked,
}

/// The navigation state: current page plus at most one selected asset.
///
/// The selection is a side channel of the transition, not a machine of its
/// own: it is set by `EditAsset`/`ViewDetails` and cleared by every move to
/// a page that does not need it.
#[derive(Debug, Clone)]
pub struct NavState {
    page: Page,
    selected: Option<Asset>,
}

impl Default for NavState {
    fn default() -> Self {
        Self::new()
    }
}

impl NavState {
    /// A fresh machine at the login page.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            page: Page::Login,
            selected: None,
        }
    }

    /// The page to render.
    ///
    /// Never exposes `AssetDetails` without a backing selection: that state
    /// is unreachable through [`Self::apply`], but a defensive fallback to
    /// the dashboard keeps the contract local.
    #[must_use]
    pub const fn current(&self) -> Page {
        match (self.page, &self.selected) {
            (Page::AssetDetails, None) => Page::Dashboard,
            (page, _) => page,
        }
    }

    /// The selected asset, present only on the details page and the form in
    /// edit mode.
    #[must_use]
    pub const fn selected(&self) -> Option<&Asset> {
        self.selected.as_ref()
    }

    /// Apply an event under the given role.
    ///
    /// Guarded events (`NewAsset`/`EditAsset` for authors, `OpenAdmin` for
    /// admins) and events fired from a page they are not legal on return
    /// [`Transition::Blocked`] without touching the state.
    pub fn apply(&mut self, event: NavEvent, role: Role) -> Transition {
        let from = self.current();
        let transition = match event {
            NavEvent::SignedIn if from == Page::Login => self.move_to(Page::Dashboard, None),
            NavEvent::GoHome => self.move_to(Page::Dashboard, None),
            NavEvent::NewAsset
                if role.can_author() && matches!(from, Page::Dashboard | Page::AssetDetails) =>
            {
                self.move_to(Page::AssetForm, None)
            }
            NavEvent::EditAsset(asset)
                if role.can_author() && matches!(from, Page::Dashboard | Page::AssetDetails) =>
            {
                self.move_to(Page::AssetForm, Some(asset))
            }
            NavEvent::ViewDetails(asset) if from == Page::Dashboard => {
                self.move_to(Page::AssetDetails, Some(asset))
            }
            NavEvent::FormSubmitted | NavEvent::FormCancelled if from == Page::AssetForm => {
                self.move_to(Page::Dashboard, None)
            }
            NavEvent::DeleteConfirmed if from == Page::AssetDetails => {
                self.move_to(Page::Dashboard, None)
            }
            NavEvent::OpenAdmin if role.is_admin() => self.move_to(Page::AdminPanel, None),
            NavEvent::OpenProfile => self.move_to(Page::Profile, None),
            NavEvent::SessionLost => self.move_to(Page::Login, None),
            _ => Transition::Blocked,
        };

        debug!(?from, to = ?self.current(), ?transition, "navigation event");
        transition
    }

    fn move_to(&mut self, page: Page, selected: Option<Asset>) -> Transition {
        self.page = page;
        self.selected = selected;
        Transition::Moved(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kv_library_core::{AssetId, CampaignType, Category};

    fn asset(id: &str) -> Asset {
        Asset {
            id: AssetId::new(id),
            name: format!("KV {id}"),
            campaign_type: CampaignType::Digital,
            category: Category::Mobile,
            uploaded_date: "2025-01-01".to_owned(),
            created_at: None,
            thumbnail: String::new(),
            source: "HQ".to_owned(),
            drive_link: String::new(),
            user_id: None,
        }
    }

    fn signed_in(role: Role) -> NavState {
        let mut nav = NavState::new();
        assert_eq!(nav.apply(NavEvent::SignedIn, role), Transition::Moved(Page::Dashboard));
        nav
    }

    #[test]
    fn test_initial_state_is_login() {
        let nav = NavState::new();
        assert_eq!(nav.current(), Page::Login);
        assert!(nav.selected().is_none());
    }

    #[test]
    fn test_sign_in_moves_to_dashboard() {
        let nav = signed_in(Role::Guest);
        assert_eq!(nav.current(), Page::Dashboard);
    }

    #[test]
    fn test_sign_in_only_legal_from_login() {
        let mut nav = signed_in(Role::Editor);
        assert_eq!(nav.apply(NavEvent::SignedIn, Role::Editor), Transition::Blocked);
        assert_eq!(nav.current(), Page::Dashboard);
    }

    #[test]
    fn test_guest_cannot_open_asset_form() {
        let mut nav = signed_in(Role::Guest);
        assert_eq!(nav.apply(NavEvent::NewAsset, Role::Guest), Transition::Blocked);
        assert_eq!(nav.current(), Page::Dashboard);

        assert_eq!(
            nav.apply(NavEvent::EditAsset(asset("kv-1")), Role::Guest),
            Transition::Blocked
        );
        assert_eq!(nav.current(), Page::Dashboard);
        assert!(nav.selected().is_none());
    }

    #[test]
    fn test_editor_opens_form_for_new_asset() {
        let mut nav = signed_in(Role::Editor);
        assert_eq!(
            nav.apply(NavEvent::NewAsset, Role::Editor),
            Transition::Moved(Page::AssetForm)
        );
        // New-asset mode carries no selection.
        assert!(nav.selected().is_none());
    }

    #[test]
    fn test_edit_from_details_carries_selection() {
        let mut nav = signed_in(Role::Editor);
        nav.apply(NavEvent::ViewDetails(asset("kv-9")), Role::Editor);
        assert_eq!(nav.current(), Page::AssetDetails);

        assert_eq!(
            nav.apply(NavEvent::EditAsset(asset("kv-9")), Role::Editor),
            Transition::Moved(Page::AssetForm)
        );
        assert_eq!(nav.selected().map(|a| a.id.as_str()), Some("kv-9"));
    }

    #[test]
    fn test_form_submit_and_cancel_return_to_dashboard() {
        for event in [NavEvent::FormSubmitted, NavEvent::FormCancelled] {
            let mut nav = signed_in(Role::Editor);
            nav.apply(NavEvent::NewAsset, Role::Editor);
            assert_eq!(nav.apply(event, Role::Editor), Transition::Moved(Page::Dashboard));
            assert!(nav.selected().is_none());
        }
    }

    #[test]
    fn test_form_submit_illegal_outside_form() {
        let mut nav = signed_in(Role::Editor);
        assert_eq!(nav.apply(NavEvent::FormSubmitted, Role::Editor), Transition::Blocked);
    }

    #[test]
    fn test_delete_confirmed_returns_to_dashboard() {
        let mut nav = signed_in(Role::Admin);
        nav.apply(NavEvent::ViewDetails(asset("kv-2")), Role::Admin);
        assert_eq!(
            nav.apply(NavEvent::DeleteConfirmed, Role::Admin),
            Transition::Moved(Page::Dashboard)
        );
        assert!(nav.selected().is_none());
    }

    #[test]
    fn test_admin_panel_gated_to_admin() {
        for (role, expected) in [
            (Role::Admin, Transition::Moved(Page::AdminPanel)),
            (Role::Editor, Transition::Blocked),
            (Role::Guest, Transition::Blocked),
        ] {
            let mut nav = signed_in(role);
            assert_eq!(nav.apply(NavEvent::OpenAdmin, role), expected);
        }
    }

    #[test]
    fn test_profile_open_from_anywhere() {
        let mut nav = signed_in(Role::Guest);
        assert_eq!(
            nav.apply(NavEvent::OpenProfile, Role::Guest),
            Transition::Moved(Page::Profile)
        );
        assert_eq!(
            nav.apply(NavEvent::GoHome, Role::Guest),
            Transition::Moved(Page::Dashboard)
        );
    }

    #[test]
    fn test_session_lost_preempts_any_page() {
        let mut nav = signed_in(Role::Editor);
        nav.apply(NavEvent::ViewDetails(asset("kv-3")), Role::Editor);
        nav.apply(NavEvent::EditAsset(asset("kv-3")), Role::Editor);
        assert_eq!(nav.current(), Page::AssetForm);

        // Mid-edit session loss drops everything unconditionally.
        assert_eq!(
            nav.apply(NavEvent::SessionLost, Role::Editor),
            Transition::Moved(Page::Login)
        );
        assert_eq!(nav.current(), Page::Login);
        assert!(nav.selected().is_none());
    }

    #[test]
    fn test_details_without_selection_falls_back_to_dashboard() {
        let nav = NavState {
            page: Page::AssetDetails,
            selected: None,
        };
        assert_eq!(nav.current(), Page::Dashboard);
    }

    #[test]
    fn test_view_details_only_from_dashboard() {
        let mut nav = signed_in(Role::Guest);
        nav.apply(NavEvent::OpenProfile, Role::Guest);
        assert_eq!(
            nav.apply(NavEvent::ViewDetails(asset("kv-4")), Role::Guest),
            Transition::Blocked
        );
        assert_eq!(nav.current(), Page::Profile);
    }
}
