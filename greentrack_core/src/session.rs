//! Session state and its persistence.
//!
//! The in-memory [`Session`] is the source of truth while the process runs;
//! the JSON file in the data directory is a cache that reseeds it on the
//! next start. The store is the single owner of that file, with file
//! locking to keep concurrent invocations from tearing it.

use crate::error::Result;
use crate::gateway::Api;
use crate::types::UserProfile;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const SESSION_FILE: &str = "session.json";

/// Lifecycle of the client's authentication state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Startup, before `restore()` has run
    Loading,
    Unauthenticated,
    Authenticated,
}

/// The client's record of who is logged in
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserProfile>,
    pub authenticated: bool,
}

/// On-disk shape. `authenticated` is derived from token presence, not
/// stored. The display preference shares this file so a logout can clear
/// the auth keys without losing it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct PersistedSession {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<UserProfile>,
    #[serde(default)]
    dark_mode: bool,
}

/// Owner of the session and its persisted copy
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    session: Session,
    state: SessionState,
    dark_mode: bool,
}

impl SessionStore {
    /// Create a store over `<data_dir>/session.json`. Call [`restore`]
    /// before reading the session.
    ///
    /// [`restore`]: SessionStore::restore
    pub fn open(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE),
            session: Session::default(),
            state: SessionState::Loading,
            dark_mode: false,
        }
    }

    /// Reseed the in-memory session from disk.
    ///
    /// A persisted token marks the session authenticated optimistically;
    /// no round-trip validates it. An expired token surfaces as a 401 on
    /// the first authenticated call instead.
    pub fn restore(&mut self) -> Result<()> {
        let persisted = Self::read_file(&self.path);
        self.dark_mode = persisted.dark_mode;
        self.session = Session {
            authenticated: persisted.token.is_some(),
            token: persisted.token,
            refresh_token: persisted.refresh_token,
            user: persisted.user,
        };
        self.state = if self.session.authenticated {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        };
        tracing::debug!("Restored session, state {:?}", self.state);
        Ok(())
    }

    /// Record a successful login and persist it
    pub fn login(
        &mut self,
        access: String,
        refresh: Option<String>,
        user: Option<UserProfile>,
    ) -> Result<()> {
        self.session = Session {
            token: Some(access),
            refresh_token: refresh,
            user,
            authenticated: true,
        };
        self.state = SessionState::Authenticated;
        self.save()
    }

    /// Tell the backend goodbye, then clear local state.
    ///
    /// The backend call is best-effort: a failure is logged and local
    /// cleanup proceeds unconditionally.
    pub async fn logout(&mut self, api: &Api) -> Result<()> {
        if let Err(e) = api.auth().logout().await {
            tracing::warn!("Logout request failed: {}. Clearing local session anyway.", e);
        }
        self.clear_local()
    }

    /// Drop the in-memory session and the persisted auth keys. The
    /// `dark_mode` preference survives.
    pub fn clear_local(&mut self) -> Result<()> {
        self.session = Session::default();
        self.state = SessionState::Unauthenticated;
        self.save()
    }

    pub fn current(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token.as_deref()
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Persist the display preference without touching auth fields
    pub fn set_dark_mode(&mut self, dark_mode: bool) -> Result<()> {
        self.dark_mode = dark_mode;
        self.save()
    }

    /// Load the persisted session with shared locking.
    ///
    /// Missing, unreadable or corrupt files all degrade to the default
    /// (logged-out) session.
    fn read_file(path: &Path) -> PersistedSession {
        if !path.exists() {
            tracing::debug!("No session file found, starting logged out");
            return PersistedSession::default();
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open session file {:?}: {}. Starting logged out.", path, e);
                return PersistedSession::default();
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock session file {:?}: {}. Starting logged out.", path, e);
            return PersistedSession::default();
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read_result = reader.read_to_string(&mut contents);
        let _ = file.unlock();
        if let Err(e) = read_result {
            tracing::warn!("Failed to read session file {:?}: {}. Starting logged out.", path, e);
            return PersistedSession::default();
        }

        match serde_json::from_str::<PersistedSession>(&contents) {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::warn!("Failed to parse session file {:?}: {}. Starting logged out.", path, e);
                PersistedSession::default()
            }
        }
    }

    /// Save the session to disk with exclusive locking.
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn save(&self) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let persisted = PersistedSession {
            token: self.session.token.clone(),
            refresh_token: self.session.refresh_token.clone(),
            user: self.session.user.clone(),
            dark_mode: self.dark_mode,
        };

        let temp = NamedTempFile::new_in(self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "session path missing parent")
        })?)?;

        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(&persisted)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path)
            .map_err(|e| crate::Error::Io(e.error))?;

        tracing::debug!("Saved session to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiClient;
    use serde_json::json;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_user() -> UserProfile {
        serde_json::from_value(json!({"username": "ada", "email": "ada@example.com"})).unwrap()
    }

    #[test]
    fn test_login_then_restore_in_fresh_store() {
        let temp_dir = tempfile::tempdir().unwrap();

        let mut store = SessionStore::open(temp_dir.path());
        store.restore().unwrap();
        store
            .login("tok-abc".into(), Some("ref-xyz".into()), Some(test_user()))
            .unwrap();

        // A fresh store over the same directory sees the session
        let mut fresh = SessionStore::open(temp_dir.path());
        assert_eq!(fresh.state(), SessionState::Loading);
        fresh.restore().unwrap();
        assert_eq!(fresh.state(), SessionState::Authenticated);
        assert!(fresh.current().authenticated);
        assert_eq!(fresh.token(), Some("tok-abc"));
        assert_eq!(fresh.current().user.as_ref().unwrap().username, "ada");
    }

    #[test]
    fn test_restore_without_file_is_unauthenticated() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::open(temp_dir.path());
        store.restore().unwrap();
        assert_eq!(store.state(), SessionState::Unauthenticated);
        assert!(!store.current().authenticated);
        assert!(store.token().is_none());
    }

    #[test]
    fn test_corrupt_file_degrades_to_logged_out() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join(SESSION_FILE), "{ not json }").unwrap();

        let mut store = SessionStore::open(temp_dir.path());
        store.restore().unwrap();
        assert_eq!(store.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_logout_clears_persisted_auth_even_when_backend_unreachable() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::open(temp_dir.path());
        store.restore().unwrap();
        store.login("tok".into(), None, Some(test_user())).unwrap();

        // Nothing listens on this port
        let api = Api::new(ApiClient::new("http://127.0.0.1:9").with_token(Some("tok".into())));
        store.logout(&api).await.unwrap();

        assert_eq!(store.state(), SessionState::Unauthenticated);
        assert!(store.token().is_none());

        let mut fresh = SessionStore::open(temp_dir.path());
        fresh.restore().unwrap();
        assert!(fresh.token().is_none());
        assert!(fresh.current().user.is_none());
        assert!(!fresh.current().authenticated);
    }

    #[tokio::test]
    async fn test_logout_calls_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/logout/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "Logged out successfully"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::open(temp_dir.path());
        store.restore().unwrap();
        store.login("tok".into(), None, None).unwrap();

        let api = Api::new(ApiClient::new(server.uri()).with_token(Some("tok".into())));
        store.logout(&api).await.unwrap();
        assert_eq!(store.state(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_dark_mode_survives_logout() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::open(temp_dir.path());
        store.restore().unwrap();
        store.login("tok".into(), None, None).unwrap();
        store.set_dark_mode(true).unwrap();

        store.clear_local().unwrap();

        let mut fresh = SessionStore::open(temp_dir.path());
        fresh.restore().unwrap();
        assert!(fresh.dark_mode());
        assert!(fresh.token().is_none());
    }

    #[test]
    fn test_save_leaves_no_stray_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::open(temp_dir.path());
        store.restore().unwrap();
        store.login("tok".into(), None, None).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != SESSION_FILE)
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only {}, found extras: {:?}",
            SESSION_FILE,
            extras
        );
    }
}
