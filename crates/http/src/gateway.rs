//! Authenticated request gateway
//!
//! Single choke point for calls that require authentication. Requests are
//! described by method, path and an optional JSON body, and rebuilt from
//! scratch on every attempt; the retry allowance is an explicit attempt
//! counter local to each call, never state stamped onto a shared request.
//!
//! Policy: inject the current bearer token, and on an unauthorized response
//! refresh the session and retry the original request at most once. A second
//! unauthorized response, or any other error status, is surfaced unmodified.

use crate::client::TaskClient;
use crate::error::ClientError;
use crate::session::SessionStore;
use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use taskpad_core::TokenStore;

/// What an `after_receive` hook wants done with a failed response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Surface the response to the caller as-is
    Forward,
    /// Re-issue the original request
    Retry,
}

/// Hook pair applied to every request the gateway issues
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Rewrite an outgoing request before it is sent
    async fn before_send(&self, request: RequestBuilder, attempt: u32) -> RequestBuilder {
        let _ = attempt;
        request
    }

    /// Inspect an error status and vote on what happens next
    ///
    /// Returning an error aborts the call with that error.
    async fn after_receive(&self, status: StatusCode, attempt: u32) -> Result<Verdict, ClientError> {
        let _ = (status, attempt);
        Ok(Verdict::Forward)
    }
}

/// Injects `Authorization: Bearer <token>` from the token store
///
/// The store is re-read on every attempt, so a token refreshed between
/// attempts is picked up automatically. The header is omitted entirely when
/// no token is held.
pub struct BearerAuth {
    store: Arc<dyn TokenStore>,
}

impl BearerAuth {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Interceptor for BearerAuth {
    async fn before_send(&self, request: RequestBuilder, _attempt: u32) -> RequestBuilder {
        match self.store.access_token() {
            Some(token) => request.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }
}

/// Refresh-and-retry policy for unauthorized responses
///
/// On the first 401 of a call, asks the session store for a fresh access
/// token. Success votes a single retry; an exhausted session aborts the call
/// with [`ClientError::SessionExpired`]. Later attempts forward the 401
/// untouched, which bounds every call to one retry.
pub struct RefreshOnUnauthorized {
    session: SessionStore,
}

impl RefreshOnUnauthorized {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Interceptor for RefreshOnUnauthorized {
    async fn after_receive(&self, status: StatusCode, attempt: u32) -> Result<Verdict, ClientError> {
        if status != StatusCode::UNAUTHORIZED || attempt > 0 {
            return Ok(Verdict::Forward);
        }
        // Concurrent 401s each refresh independently; the store's last write
        // wins and every write is a valid token.
        match self.session.refresh().await {
            Some(_) => Ok(Verdict::Retry),
            None => {
                self.session.logout();
                Err(ClientError::SessionExpired)
            }
        }
    }
}

type SessionExpiredHandler = Arc<dyn Fn() + Send + Sync>;

/// Authenticated request gateway
#[derive(Clone)]
pub struct Gateway {
    client: TaskClient,
    interceptors: Vec<Arc<dyn Interceptor>>,
    on_session_expired: Option<SessionExpiredHandler>,
}

impl Gateway {
    /// Create a gateway with the standard bearer-auth and refresh-on-401 chain
    pub fn new(client: TaskClient, session: SessionStore) -> Self {
        let interceptors: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(BearerAuth::new(session.token_store())),
            Arc::new(RefreshOnUnauthorized::new(session)),
        ];
        Self {
            client,
            interceptors,
            on_session_expired: None,
        }
    }

    /// Append an interceptor to the chain
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Register a handler invoked when the session is fatally lost
    ///
    /// This is the caller's hook for returning to an unauthenticated state,
    /// e.g. prompting for a new login.
    #[must_use]
    pub fn on_session_expired(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_expired = Some(Arc::new(handler));
        self
    }

    /// Issue a request and decode a JSON response body
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        let response = self.dispatch(method, path, body.as_ref()).await?;
        Ok(response.json().await?)
    }

    /// Issue a request whose success response carries no body
    pub async fn execute_empty(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<(), ClientError> {
        self.dispatch(method, path, body.as_ref()).await?;
        Ok(())
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, ClientError> {
        let mut attempt: u32 = 0;
        loop {
            let mut request = self.client.request(method.clone(), path);
            if let Some(body) = body {
                request = request.json(body);
            }
            for interceptor in &self.interceptors {
                request = interceptor.before_send(request, attempt).await;
            }

            tracing::debug!(%method, path, attempt, "issuing request");
            let response = request.send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let mut verdict = Verdict::Forward;
            for interceptor in &self.interceptors {
                match interceptor.after_receive(status, attempt).await {
                    Ok(Verdict::Forward) => {}
                    Ok(Verdict::Retry) => {
                        verdict = Verdict::Retry;
                        break;
                    }
                    Err(e) => {
                        if e.is_auth_expired() {
                            self.notify_session_expired();
                        }
                        return Err(e);
                    }
                }
            }

            match verdict {
                Verdict::Retry => {
                    attempt += 1;
                    tracing::debug!(%method, path, "retrying with refreshed token");
                }
                Verdict::Forward => {
                    let message = response.text().await.unwrap_or_else(|_| status.to_string());
                    return Err(ClientError::from_status(status, message));
                }
            }
        }
    }

    fn notify_session_expired(&self) {
        if let Some(handler) = &self.on_session_expired {
            handler();
        }
    }
}
