//! Client library for the CookFlow recipe API.
//!
//! This crate provides everything a front end needs to talk to the CookFlow
//! backend: an authenticated request gateway with transparent access-token
//! refresh, a typed service layer for the recipe/category/shopping-list
//! endpoints, and persistent token storage.
//!
//! The API uses JWT bearer token authentication. Access tokens are
//! short-lived; the gateway refreshes them on demand through the
//! `/token/refresh/` endpoint and broadcasts auth-state changes so UI
//! layers can react without polling.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, Gateway, RefreshError};
pub use auth::{AuthEvent, AuthEvents, Claims, TokenStore};
pub use config::Config;
