// app/src/lib.rs

//! Group ordering: shared orders with a deadline and participant cap, where
//! every participant keeps one editable item submission and every viewer
//! sees the item list live.
//!
//! Operations take a [`Backend`] holding the optional document store and
//! identity provider, and fail with `backend-unavailable` or
//! `unauthenticated` when a capability they need is missing.

pub mod backend;
pub mod config;
pub mod errors;
pub mod identity;
pub mod models;
pub mod pipelines;
pub mod schemas;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

pub use backend::Backend;
pub use errors::{AppError, Result};
pub use identity::{bootstrap_session, ensure_anonymous_identity, Identity, IdentityProvider};
pub use services::{
  create_group_order, get_detail_order, subscribe_order_items, upsert_order_item, watch_order_items, Unsubscribe,
};
