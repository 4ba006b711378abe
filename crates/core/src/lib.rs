//! KV Library Core - Shared types library.
//!
//! This crate provides the domain types used across all KV Library
//! components:
//! - `client` - The catalog application core (navigation, views, mutations)
//! - `integration-tests` - End-to-end flows over fake collaborators
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! collaborator contracts. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, roles, and the canonical asset shapes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
