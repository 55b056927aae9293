//! Durable token storage
//!
//! A session is two named string slots: the access token and the refresh
//! token. Stores hand out current values on every read; nothing caches a
//! token across calls, so a refresh performed by one caller is visible to
//! the next read everywhere.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Access/refresh token pair issued by the token endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Storage backend for the two session token slots
///
/// All methods are synchronous and infallible from the caller's point of
/// view; durable backends log persistence failures rather than surfacing
/// them, since an unwritable token file degrades to an in-memory session.
pub trait TokenStore: Send + Sync {
    /// Current access token, if a session is held
    fn access_token(&self) -> Option<String>;

    /// Current refresh token, if a session is held
    fn refresh_token(&self) -> Option<String>;

    /// Store a freshly issued pair, replacing any previous session
    fn set_pair(&self, access: &str, refresh: &str);

    /// Replace only the access token, preserving the refresh token
    fn set_access(&self, access: &str);

    /// Drop both tokens; idempotent
    fn clear(&self);
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct Slots {
    access: Option<String>,
    refresh: Option<String>,
}

/// In-memory token store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: RwLock<Slots>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.inner.read().expect("token store lock").access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.inner.read().expect("token store lock").refresh.clone()
    }

    fn set_pair(&self, access: &str, refresh: &str) {
        let mut slots = self.inner.write().expect("token store lock");
        slots.access = Some(access.to_owned());
        slots.refresh = Some(refresh.to_owned());
    }

    fn set_access(&self, access: &str) {
        let mut slots = self.inner.write().expect("token store lock");
        slots.access = Some(access.to_owned());
    }

    fn clear(&self) {
        let mut slots = self.inner.write().expect("token store lock");
        *slots = Slots::default();
    }
}

/// File-backed token store
///
/// Persists the two slots as a small JSON document, loaded once on open and
/// written through on every mutation. A missing or unreadable file starts an
/// empty session rather than failing.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    inner: RwLock<Slots>,
}

impl FileTokenStore {
    /// Open a store at the given path, reading any persisted session
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let slots = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed token file");
                Slots::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Slots::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read token file");
                Slots::default()
            }
        };
        Self {
            path,
            inner: RwLock::new(slots),
        }
    }

    /// Open a store at the platform default location
    pub fn open_default() -> Option<Self> {
        Some(Self::open(Self::default_path()?))
    }

    /// Platform data-dir location of the token file
    pub fn default_path() -> Option<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "taskpad")?;
        Some(dirs.data_dir().join("session.json"))
    }

    /// Path this store persists to
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, slots: &Slots) {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(slots)?;
            std::fs::write(&self.path, contents)
        };
        if let Err(e) = write() {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to persist tokens");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        self.inner.read().expect("token store lock").access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.inner.read().expect("token store lock").refresh.clone()
    }

    fn set_pair(&self, access: &str, refresh: &str) {
        let mut slots = self.inner.write().expect("token store lock");
        slots.access = Some(access.to_owned());
        slots.refresh = Some(refresh.to_owned());
        self.persist(&slots);
    }

    fn set_access(&self, access: &str) {
        let mut slots = self.inner.write().expect("token store lock");
        slots.access = Some(access.to_owned());
        self.persist(&slots);
    }

    fn clear(&self) {
        let mut slots = self.inner.write().expect("token store lock");
        *slots = Slots::default();
        self.persist(&slots);
    }
}
