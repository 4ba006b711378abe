//! Core types for KV Library.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod asset;
pub mod email;
pub mod id;
pub mod role;
pub mod user;

pub use asset::{Asset, AssetDraft, CampaignType, Category};
pub use email::{Email, EmailError};
pub use id::*;
pub use role::{Role, UserStatus};
pub use user::User;
