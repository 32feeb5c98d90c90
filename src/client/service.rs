//! The client façade: pagination, authenticated calls and login

use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::Sender,
    Arc, Mutex, MutexGuard, PoisonError,
};

use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use super::{
    api::GistApi,
    config::ClientConfig,
    cursor::PageCursor,
    decode::{decode_gist_page, decode_text},
    error::{ClientError, Result},
    oauth::{AuthorizationPresenter, FlowState, OAuthFlow, OAuthToken, TokenStore},
    request::GistRequest,
};
use crate::{
    dispatcher::Dispatcher,
    domain::Gist,
    event::{GistEvent, IntoGistEvent},
    result::GistrError,
};

/// Single entry point for talking to GitHub Gists
///
/// Owns the pagination cursor and allows one page fetch at a time; a caller
/// arriving while a fetch is outstanding gets [`ClientError::Busy`].
#[derive(Debug)]
pub struct GistClient {
    api: Arc<GistApi>,
    oauth: OAuthFlow,
    cursor: Mutex<Option<PageCursor>>,
    in_flight: AtomicBool,
    handle: Handle,
}

impl GistClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        let api = Arc::new(GistApi::new(config)?);
        Self::from_api(api)
    }

    /// Create a client from an existing API transport
    pub fn from_api(api: Arc<GistApi>) -> Result<Self> {
        let handle = Handle::try_current().map_err(|_| {
            ClientError::config("GistClient must be created within a Tokio runtime context")
        })?;
        let oauth = OAuthFlow::new(api.clone(), TokenStore::default());

        Ok(Self {
            api,
            oauth,
            cursor: Mutex::new(None),
            in_flight: AtomicBool::new(false),
            handle,
        })
    }

    /// Fetch the page after the last one fetched, or the first page when
    /// pagination has not started or has run out.
    #[instrument(skip(self))]
    pub async fn fetch_next_page(&self) -> Result<Vec<Gist>> {
        let _in_flight = InFlight::claim(&self.in_flight).ok_or_else(|| {
            debug!("Page fetch already in flight");
            ClientError::Busy
        })?;

        let cursor = self.lock_cursor().clone();
        let first_page = cursor.is_none();
        let request = self.api.request(&GistRequest::PublicGists { cursor })?;

        match decode_gist_page(self.api.execute(request).await) {
            Ok((gists, next)) => {
                info!(
                    gist_count = gists.len(),
                    first_page,
                    has_next_page = next.is_some(),
                    "Fetched gist page"
                );
                *self.lock_cursor() = next;
                Ok(gists)
            },
            Err(e) => {
                error!(error = %e, network = e.is_network_error(), "Failed to fetch gist page");
                Err(e)
            },
        }
    }

    /// Start over from the first page and drop cached responses
    pub fn reset_pagination(&self) {
        debug!("Resetting pagination");
        *self.lock_cursor() = None;
        self.api.clear_cache();
    }

    /// Whether the last fetched page pointed at another one
    pub fn has_more_pages(&self) -> bool {
        self.lock_cursor().is_some()
    }

    /// Fetch the signed-in user's gists as the raw response body
    ///
    /// Without a token the request is still sent; GitHub's refusal comes back
    /// as [`ClientError::ApiProvider`].
    #[instrument(skip(self))]
    pub async fn fetch_authenticated_gists(&self) -> Result<String> {
        let token = self.current_token();
        if token.is_none() {
            warn!("Requesting user gists without an OAuth token");
        }

        let request = self.api.request(&GistRequest::UserGists { token })?;
        match decode_text(self.api.execute(request).await) {
            Ok(body) => {
                info!(body_length = body.len(), "Fetched user gists");
                Ok(body)
            },
            Err(e) => {
                error!(error = %e, "Failed to fetch user gists");
                Err(e)
            },
        }
    }

    /// Show GitHub's authorization page through the presenter
    pub fn begin_login(&self, presenter: &dyn AuthorizationPresenter) -> Result<Url> {
        self.oauth.begin_login(presenter)
    }

    /// Forward the redirect GitHub sent the user back with
    pub async fn handle_redirect(&self, redirect: &str) -> Result<Option<OAuthToken>> {
        self.oauth.handle_redirect(redirect).await
    }

    pub fn cancel_login(&self) -> bool {
        self.oauth.cancel()
    }

    pub fn current_token(&self) -> Option<OAuthToken> {
        self.oauth.current_token()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.oauth.state(), FlowState::Authenticated)
    }

    /// Fetch the next page on the runtime and report the outcome as exactly
    /// one event: [`GistEvent::GistsFetched`] or [`GistEvent::AppError`].
    pub fn spawn_fetch_next_page(self: &Arc<Self>, sender: Sender<GistEvent>) -> JoinHandle<()> {
        let client = Arc::clone(self);
        self.handle.spawn(async move {
            match client.fetch_next_page().await {
                Ok(gists) => sender.dispatch(gists.into_gist_event()),
                Err(e) => sender.dispatch(GistrError::from(&e).into()),
            }
        })
    }

    fn lock_cursor(&self) -> MutexGuard<'_, Option<PageCursor>> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the single-flight slot; released on drop, whatever the outcome.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
