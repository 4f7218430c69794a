//! Shared, lazily created HTTP session.
//!
//! Every outbound call goes through one pooled `reqwest::Client` so connection
//! setup (DNS, TLS) is paid once per process rather than once per request.

use crate::Result;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use std::sync::{
    Arc, Mutex, OnceLock,
    atomic::{AtomicU64, AtomicUsize, Ordering},
};
use tracing::debug;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);
static GLOBAL: OnceLock<Arc<SessionManager>> = OnceLock::new();

type BuilderFactory = Box<dyn Fn() -> reqwest::ClientBuilder + Send + Sync>;

/// Cheap, clonable handle to a pooled HTTP client.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    id: u64,
    client: reqwest::Client,
}

impl Session {
    fn build(builder: reqwest::ClientBuilder) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = builder.default_headers(headers).build()?;
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);

        Ok(Self {
            inner: Arc::new(SessionInner { id, client }),
        })
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.inner.client
    }

    /// True when both handles share the same connection pool.
    pub fn same_as(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Owns at most one live [`Session`] and recreates it after [`shutdown`](Self::shutdown).
pub struct SessionManager {
    slot: Mutex<Option<Session>>,
    builder: BuilderFactory,
    created: AtomicUsize,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_builder(reqwest::Client::builder)
    }

    /// Uses `factory` to configure each new client, e.g. to relax TLS checks or add a timeout.
    pub fn with_builder(
        factory: impl Fn() -> reqwest::ClientBuilder + Send + Sync + 'static,
    ) -> Self {
        Self {
            slot: Mutex::new(None),
            builder: Box::new(factory),
            created: AtomicUsize::new(0),
        }
    }

    /// The process-wide manager used when no manager is injected.
    pub fn global() -> Arc<SessionManager> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(SessionManager::new())))
    }

    /// Returns the live session, creating it on first use.
    ///
    /// Creation happens under the slot lock, so concurrent first callers all
    /// observe the same session.
    pub fn acquire(&self) -> Result<Session> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(session) = slot.as_ref() {
            return Ok(session.clone());
        }

        let session = Session::build((self.builder)())?;
        self.created.fetch_add(1, Ordering::Relaxed);
        debug!("Created HTTP session {}", session.id());

        *slot = Some(session.clone());
        Ok(session)
    }

    /// Drops the manager's handle. Requests still holding a clone finish on the
    /// old pool, which is released once the last clone goes away.
    pub fn shutdown(&self) {
        let previous = self.slot.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(session) = previous {
            debug!("Shut down HTTP session {}", session.id());
        }
    }

    pub fn is_active(&self) -> bool {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Number of sessions this manager has built so far.
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("active", &self.is_active())
            .field("created", &self.created_count())
            .finish()
    }
}
