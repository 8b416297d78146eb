//! HTTP layer for the CookFlow API.
//!
//! `Gateway` owns the transport concerns: bearer token attachment,
//! 401 detection, coordinated token refresh with request replay, and
//! forced logout when the session is unrecoverable.
//!
//! `ApiClient` is the typed service layer on top of it - login/logout and
//! the recipe, category, favorite, shopping-list and user endpoints.

pub mod client;
pub mod error;
pub mod gateway;

pub use client::ApiClient;
pub use error::{ApiError, RefreshError};
pub use gateway::Gateway;
