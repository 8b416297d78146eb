//! Authentication module for managing tokens and auth-state notifications.
//!
//! This module provides:
//! - `TokenStore`: persistent access/refresh token storage
//! - `Claims` / `decode_claims`: unverified JWT payload inspection
//! - `AuthEvents`: broadcast channel for auth-state transitions
//!
//! Tokens are persisted to disk; the access token's expiry comes from its
//! `exp` claim, read without signature verification.

pub mod claims;
pub mod events;
pub mod store;

pub use claims::{decode_claims, Claims, ClaimsError};
pub use events::{AuthEvent, AuthEvents};
pub use store::TokenStore;
