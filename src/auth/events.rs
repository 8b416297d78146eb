//! Broadcast notifications for auth-state transitions.
//!
//! UI layers subscribe once and re-derive their authenticated view when an
//! event arrives, instead of polling the token store.

use tokio::sync::broadcast;
use tracing::debug;

/// Capacity of the broadcast channel. Auth transitions are rare; a lagging
/// subscriber only ever needs the most recent few.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// An authentication state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// A credential pair was stored after a successful login.
    LoggedIn,
    /// The access token was replaced after a successful refresh.
    Refreshed,
    /// The credential store was cleared, by explicit logout or forced
    /// logout after a failed refresh.
    LoggedOut,
}

/// Publisher for auth-state transitions.
///
/// Clone is cheap - all clones publish into the same channel.
#[derive(Clone)]
pub struct AuthEvents {
    sender: broadcast::Sender<AuthEvent>,
}

impl AuthEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe to auth-state transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.sender.subscribe()
    }

    /// Publish a transition. Having no subscribers is not an error.
    pub fn publish(&self, event: AuthEvent) {
        debug!(?event, "Auth state changed");
        let _ = self.sender.send(event);
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}
