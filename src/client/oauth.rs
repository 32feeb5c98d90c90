//! OAuth2 authorization-code login
//!
//! The flow moves through `Idle → Presenting → ExchangingCode → Authenticated`
//! and falls back to `Idle` whenever an attempt fails. Errors are returned to
//! the caller, never stored.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use compact_str::CompactString;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{
    api::GistApi,
    config::OAuthConfig,
    decode::decode_token_exchange,
    error::{ClientError, Result},
    request::GistRequest,
};

/// Bearer token obtained from the code exchange
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthToken(CompactString);

impl OAuthToken {
    pub fn new(token: impl Into<CompactString>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OAuthToken(<redacted>)")
    }
}

/// In-memory token slot shared by the login flow (writer) and the client (reader)
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<OAuthToken>>>,
}

impl TokenStore {
    pub fn get(&self) -> Option<OAuthToken> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set(&self, token: OAuthToken) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }
}

/// Displays the authorization page to the user.
///
/// Implemented by whoever owns the user interface; the client only decides
/// *what* to show. The eventual redirect must be handed back, unchanged, to
/// [`OAuthFlow::handle_redirect`].
pub trait AuthorizationPresenter {
    fn present_authorization(&self, url: &Url);
}

/// A pending authorization attempt
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub credentials: OAuthConfig,
}

#[derive(Debug, Clone)]
pub enum FlowState {
    Idle,
    Presenting(AuthorizationRequest),
    ExchangingCode,
    Authenticated,
}

/// Drives the authorization-code exchange and owns the resulting token
#[derive(Debug)]
pub struct OAuthFlow {
    api: Arc<GistApi>,
    credentials: OAuthConfig,
    tokens: TokenStore,
    state: Mutex<FlowState>,
}

/// What the redirect carried
enum RedirectOutcome {
    Code(String),
    Denied(String),
    Ignored,
}

impl OAuthFlow {
    pub fn new(api: Arc<GistApi>, tokens: TokenStore) -> Self {
        let credentials = api.config().oauth.clone();
        Self {
            api,
            credentials,
            tokens,
            state: Mutex::new(FlowState::Idle),
        }
    }

    /// Ask the presenter to show GitHub's authorize page.
    ///
    /// Starting over while a previous page is still presented replaces the
    /// pending request; starting while a code exchange runs is refused.
    #[instrument(skip_all)]
    pub fn begin_login(&self, presenter: &dyn AuthorizationPresenter) -> Result<Url> {
        let url = {
            let mut state = self.lock_state();
            if matches!(*state, FlowState::ExchangingCode) {
                return Err(ClientError::Busy);
            }
            self.credentials.ensure_credentials()?;

            let url = self
                .api
                .request(&GistRequest::AuthorizeUrl {
                    client_id: self.credentials.client_id.clone(),
                    scope: self.credentials.scope.clone(),
                    state: self.credentials.state.clone(),
                })?
                .url;

            *state = FlowState::Presenting(AuthorizationRequest {
                credentials: self.credentials.clone(),
            });
            url
        };

        info!(url = %url, "Presenting GitHub authorization page");
        presenter.present_authorization(&url);
        Ok(url)
    }

    /// Process the URL GitHub redirected to after the user answered.
    ///
    /// Returns `Ok(None)` when the URL carries neither a `code` nor an `error`
    /// parameter; such redirects are ignored and leave the state untouched.
    #[instrument(skip_all)]
    pub async fn handle_redirect(&self, redirect: &str) -> Result<Option<OAuthToken>> {
        let url = Url::parse(redirect.trim()).map_err(|_| ClientError::invalid_url(redirect))?;

        let code = {
            let mut state = self.lock_state();
            let expected_state = match &*state {
                FlowState::ExchangingCode => return Err(ClientError::Busy),
                FlowState::Presenting(request) => Some(request.credentials.state.clone()),
                FlowState::Idle | FlowState::Authenticated => None,
            };

            match inspect_redirect(&url) {
                RedirectOutcome::Ignored => {
                    debug!("Redirect carries no authorization code, ignoring");
                    return Ok(None);
                },
                RedirectOutcome::Denied(reason) => {
                    warn!(reason = %reason, "Authorization was not granted");
                    *state = FlowState::Idle;
                    return Err(ClientError::auth_could_not(reason));
                },
                RedirectOutcome::Code(code) => {
                    let returned_state = query_value(&url, "state");
                    if let (Some(expected), Some(returned)) = (expected_state, returned_state) {
                        if expected != returned.as_str() {
                            warn!("Redirect state does not match the pending request");
                            *state = FlowState::Idle;
                            return Err(ClientError::auth_could_not("state mismatch"));
                        }
                    }

                    *state = FlowState::ExchangingCode;
                    code
                },
            }
        };

        let exchange = ExchangeGuard { flow: self, finished: false };
        let result = exchange.run(&code).await;

        match result {
            Ok(token) => {
                info!("GitHub authorization complete");
                Ok(Some(token))
            },
            Err(e) => {
                warn!(error = %e, "Token exchange failed");
                Err(e)
            },
        }
    }

    /// Drop a presented request that the user walked away from
    pub fn cancel(&self) -> bool {
        let mut state = self.lock_state();
        if matches!(*state, FlowState::Presenting(_)) {
            debug!("Authorization request cancelled");
            *state = FlowState::Idle;
            true
        } else {
            false
        }
    }

    pub fn current_token(&self) -> Option<OAuthToken> {
        self.tokens.get()
    }

    pub fn state(&self) -> FlowState {
        self.lock_state().clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthToken> {
        self.credentials.ensure_credentials()?;

        let request = self.api.request(&GistRequest::ExchangeOAuthCode {
            client_id: self.credentials.client_id.clone(),
            client_secret: self.credentials.client_secret.clone(),
            code: code.into(),
        })?;

        decode_token_exchange(self.api.execute(request).await)
    }
}

/// Settles the flow state once the exchange ends, including when the
/// exchanging future is dropped before completion.
struct ExchangeGuard<'a> {
    flow: &'a OAuthFlow,
    finished: bool,
}

impl ExchangeGuard<'_> {
    async fn run(mut self, code: &str) -> Result<OAuthToken> {
        let result = self.flow.exchange_code(code).await;

        let mut state = self.flow.lock_state();
        match &result {
            Ok(token) => {
                self.flow.tokens.set(token.clone());
                *state = FlowState::Authenticated;
            },
            Err(_) => *state = FlowState::Idle,
        }
        self.finished = true;
        result
    }
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *self.flow.lock_state() = FlowState::Idle;
        }
    }
}

fn inspect_redirect(url: &Url) -> RedirectOutcome {
    let code = url
        .query_pairs()
        .find(|(name, _)| name.eq_ignore_ascii_case("code"))
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty());

    if let Some(code) = code {
        return RedirectOutcome::Code(code);
    }

    match query_value(url, "error") {
        Some(error) => {
            let reason = query_value(url, "error_description").unwrap_or(error);
            RedirectOutcome::Denied(reason)
        },
        None => RedirectOutcome::Ignored,
    }
}

fn query_value(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
