//! File-backed admin session flag.
//!
//! The flag is a marker file named after [`SESSION_KEY`] inside the session
//! directory. It survives restarts until `logout` removes it.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use trashclean_core::session::SESSION_KEY;
use trashclean_core::{ApiError, SessionStore};

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SESSION_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn is_set(&self) -> bool {
        fs::read_to_string(&self.path).is_ok_and(|v| v.trim() == "1")
    }

    fn set(&self) -> Result<(), ApiError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| storage_error(dir, e))?;
        }
        fs::write(&self.path, "1").map_err(|e| storage_error(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), "admin session stored");
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }
}

fn storage_error(path: &Path, err: std::io::Error) -> ApiError {
    ApiError::Storage(format!("{}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use trashclean_core::AdminSession;

    #[test]
    fn flag_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested"));
        assert!(!store.is_set());
        store.set().unwrap();
        assert!(store.is_set());
        assert!(FileSessionStore::new(dir.path().join("nested")).is_set());
        store.clear().unwrap();
        assert!(!store.is_set());
    }

    #[test]
    fn clear_without_flag_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileSessionStore::new(dir.path()).clear().is_ok());
    }

    #[test]
    fn session_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = AdminSession::restore(FileSessionStore::new(dir.path()));
        session.login("pw", "pw").unwrap();

        let restored = AdminSession::restore(FileSessionStore::new(dir.path()));
        assert!(restored.is_authenticated());
    }

    #[test]
    fn foreign_content_is_not_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        fs::write(store.path(), "yes").unwrap();
        assert!(!store.is_set());
    }
}
