//! Session token storage
//!
//! The client never keeps tokens itself; it reads and writes them through a [`TokenStore`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{ClientError, ClientResult};

/// Access and refresh token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

pub trait TokenStore: Send + Sync {
    /// Current session, if logged in
    fn get(&self) -> ClientResult<Option<Session>>;

    fn set(&self, session: Session) -> ClientResult<()>;

    fn clear(&self) -> ClientResult<()>;
}

/// Session held in process memory
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: Mutex<Option<Session>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }

    fn lock(&self) -> ClientResult<std::sync::MutexGuard<'_, Option<Session>>> {
        self.session
            .lock()
            .map_err(|_| ClientError::Store("session lock poisoned".to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> ClientResult<Option<Session>> {
        Ok(self.lock()?.clone())
    }

    fn set(&self, session: Session) -> ClientResult<()> {
        *self.lock()? = Some(session);
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.lock()? = None;
        Ok(())
    }
}

/// Session persisted as a JSON file, surviving restarts
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> ClientResult<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn set(&self, session: Session) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&session)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session(access: &str) -> Session {
        Session {
            access_token: access.to_string(),
            refresh_token: "refresh".to_string(),
        }
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get().unwrap(), None);

        store.set(session("a")).unwrap();
        assert_eq!(store.get().unwrap(), Some(session("a")));

        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let store = FileTokenStore::new(&path);

        assert_eq!(store.get().unwrap(), None);
        store.set(session("a")).unwrap();

        // A second store on the same file sees the session
        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.get().unwrap(), Some(session("a")));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("accessToken"));

        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(reopened.get().unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let result = FileTokenStore::new(&path).get();
        assert!(matches!(result, Err(ClientError::Serialization(_))));
    }
}
