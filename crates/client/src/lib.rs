//! KV Library client application core.
//!
//! This crate holds everything with non-trivial logic in the catalog
//! application: the navigation state machine, the catalog view engine, the
//! mutation workflow, and the adapters that talk to the Supabase backend
//! (auth, PostgREST, storage). Presentation is out of scope - a rendering
//! layer reads the state exposed by [`app::App`] and feeds user actions back
//! in as the documented operations.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod identity;
pub mod nav;
pub mod supabase;
