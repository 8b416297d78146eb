//! Authenticated request gateway for the CookFlow API.
//!
//! Every request goes out through [`Gateway::send`], which attaches the
//! stored bearer token and recovers from an expired access token exactly
//! once per request. When several in-flight requests hit 401 at the same
//! time, only one refresh call is made; the rest queue behind it and are
//! replayed in arrival order once the refresh settles. A failed refresh is
//! terminal for the whole batch: tokens are cleared and `LoggedOut` is
//! broadcast so the UI can drop to its unauthenticated view.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::auth::{AuthEvent, AuthEvents, TokenStore};

use super::error::{ApiError, RefreshError};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Timeout for the token refresh call in seconds.
/// A hung refresh would otherwise hold the waiter queue open indefinitely.
const REFRESH_TIMEOUT_SECS: u64 = 15;

/// Paths excluded from token attachment and from refresh-triggering.
/// Refreshing in response to a 401 from these would recurse forever.
const EXEMPT_PATHS: &[&str] = &["/token/", "/token/refresh/"];

/// Paths that keep their bearer token but whose 401s pass straight
/// through. Server-side logout is best-effort; refreshing a session the
/// caller is discarding would force a second logout cycle.
const NO_REFRESH_PATHS: &[&str] = &["/logout/"];

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Refresh coordination state. `in_flight` gates whether a new refresh
/// cycle may start; `waiters` holds the continuations of requests that hit
/// 401 while one was already running, in arrival order.
#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    waiters: VecDeque<oneshot::Sender<Result<String, RefreshError>>>,
}

/// Gateway for authenticated requests.
///
/// Construct once at startup and share via `Arc`; a fresh instance per
/// test gives a clean refresh state.
pub struct Gateway {
    client: Client,
    base_url: String,
    store: Arc<TokenStore>,
    events: AuthEvents,
    refresh: Mutex<RefreshState>,
}

impl Gateway {
    pub fn new(base_url: String, store: Arc<TokenStore>, events: AuthEvents) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            events,
            refresh: Mutex::new(RefreshState::default()),
        })
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn events(&self) -> &AuthEvents {
        &self.events
    }

    /// Whether a path is excluded from token attachment and from the
    /// refresh flow.
    fn is_exempt(path: &str) -> bool {
        EXEMPT_PATHS.contains(&path)
    }

    /// Whether a 401 from this path is returned as-is instead of starting
    /// a refresh cycle.
    fn skips_refresh(path: &str) -> bool {
        NO_REFRESH_PATHS.contains(&path)
    }

    /// Send a request, attaching the stored access token when one is valid
    /// and transparently refreshing it on a 401.
    ///
    /// Returns the response for any non-401 status; callers inspect it with
    /// [`Gateway::check_response`] or the typed verbs below. A 401 that
    /// survives one refresh-and-replay surfaces as `ApiError::SessionExpired`.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&Value>,
    ) -> Result<Response> {
        let exempt = Self::is_exempt(path);
        let token = if !exempt && self.store.is_access_valid() {
            self.store.access_token()
        } else {
            None
        };

        let response = self
            .dispatch(&method, path, query, body, token.as_deref())
            .await
            .map_err(ApiError::NetworkError)
            .with_context(|| format!("Failed to send {} request to {}", method, path))?;

        if exempt || Self::skips_refresh(path) || response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        warn!(path, "Access token rejected, attempting refresh");
        let fresh = self.refresh_access_token().await.map_err(ApiError::from)?;

        let retried = self
            .dispatch(&method, path, query, body, Some(&fresh))
            .await
            .map_err(ApiError::NetworkError)
            .with_context(|| format!("Failed to replay {} request to {}", method, path))?;

        // A second 401 after a successful refresh is a fatal session
        // condition, not a transient one. Never refresh again here.
        if retried.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::SessionExpired.into());
        }

        debug!(path, "Request replayed with refreshed token");
        Ok(retried)
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method.clone(), &url);
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await
    }

    /// Obtain a fresh access token, coordinating with any refresh already
    /// in flight. At most one live refresh call regardless of how many
    /// requests fail concurrently.
    async fn refresh_access_token(&self) -> Result<String, RefreshError> {
        let waiter = {
            let mut state = self.lock_refresh();
            if state.in_flight {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                Some(rx)
            } else {
                state.in_flight = true;
                None
            }
        };

        if let Some(rx) = waiter {
            debug!("Refresh already in flight, queueing request");
            return rx.await.map_err(|_| RefreshError::Interrupted)?;
        }

        let outcome = self.run_refresh().await;

        // Settle the cycle: clear the flag and take the queue in one
        // critical section so no waiter can slip between them.
        let waiters = {
            let mut state = self.lock_refresh();
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };

        match &outcome {
            Ok(_) => {
                debug!(queued = waiters.len(), "Token refresh succeeded, releasing queue");
                self.events.publish(AuthEvent::Refreshed);
            }
            Err(err) => {
                warn!(error = %err, queued = waiters.len(), "Token refresh failed, forcing logout");
                if let Err(clear_err) = self.store.clear() {
                    warn!(error = %clear_err, "Failed to clear token store");
                }
                self.events.publish(AuthEvent::LoggedOut);
            }
        }

        // FIFO release: waiters were queued in arrival order.
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }

        outcome
    }

    /// Perform the actual refresh call. Only ever entered by the task that
    /// won the in-flight flag.
    async fn run_refresh(&self) -> Result<String, RefreshError> {
        let refresh_token = self
            .store
            .refresh_token()
            .ok_or(RefreshError::NoRefreshToken)?;

        let url = format!("{}/token/refresh/", self.base_url);
        let request = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "refresh": refresh_token }))
            .send();

        let response = tokio::time::timeout(Duration::from_secs(REFRESH_TIMEOUT_SECS), request)
            .await
            .map_err(|_| RefreshError::TimedOut)?
            .map_err(|e| RefreshError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RefreshError::Rejected(response.status().as_u16()));
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| RefreshError::Network(e.to_string()))?;

        self.store
            .set_access(body.access.clone())
            .map_err(|e| RefreshError::Storage(e.to_string()))?;

        Ok(body.access)
    }

    fn lock_refresh(&self) -> MutexGuard<'_, RefreshState> {
        self.refresh.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check if response is successful, returning an error with body if not.
    pub async fn check_response(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    // ===== Typed verbs =====

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(Method::GET, path, None, None).await?;
        Self::decode(response, path).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.send(Method::GET, path, Some(query), None).await?;
        Self::decode(response, path).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let response = self.send(Method::POST, path, None, Some(body)).await?;
        Self::decode(response, path).await
    }

    pub async fn patch<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let response = self.send(Method::PATCH, path, None, Some(body)).await?;
        Self::decode(response, path).await
    }

    /// DELETE returning no body (the API answers 204 on success).
    pub async fn delete(&self, path: &str) -> Result<()> {
        let response = self.send(Method::DELETE, path, None, None).await?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T> {
        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_endpoints_are_exempt() {
        assert!(Gateway::is_exempt("/token/"));
        assert!(Gateway::is_exempt("/token/refresh/"));
    }

    #[test]
    fn data_endpoints_are_not_exempt() {
        assert!(!Gateway::is_exempt("/recipes/recipes/"));
        assert!(!Gateway::is_exempt("/logout/"));
        assert!(!Gateway::is_exempt("/users/me/"));
        // Prefix of an exempt path is not itself exempt
        assert!(!Gateway::is_exempt("/token"));
    }

    #[test]
    fn logout_keeps_its_token_but_never_refreshes() {
        assert!(!Gateway::is_exempt("/logout/"));
        assert!(Gateway::skips_refresh("/logout/"));
        assert!(!Gateway::skips_refresh("/recipes/recipes/"));
        assert!(!Gateway::skips_refresh("/users/me/"));
    }

    #[test]
    fn waiters_drain_in_arrival_order() {
        let mut state = RefreshState::default();
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            receivers.push(rx);
        }

        let drained = std::mem::take(&mut state.waiters);
        for (i, waiter) in drained.into_iter().enumerate() {
            waiter
                .send(Ok(format!("token-{}", i)))
                .expect("receiver alive");
        }

        for (i, rx) in receivers.into_iter().enumerate() {
            let token = rx
                .blocking_recv()
                .expect("sender fired")
                .expect("refresh ok");
            assert_eq!(token, format!("token-{}", i));
        }
    }
}
