//! Key/value persistence for the two session entries

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The only two entries the client ever persists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    Token,
    User,
}

impl SessionKey {
    pub fn file_name(&self) -> &'static str {
        match self {
            SessionKey::Token => "token",
            SessionKey::User => "user.json",
        }
    }
}

/// Storage for session entries
pub trait SessionBackend: Send + Sync {
    fn read(&self, key: SessionKey) -> io::Result<Option<String>>;

    fn write(&self, key: SessionKey, value: &str) -> io::Result<()>;

    /// Removing a missing entry is not an error
    fn remove(&self, key: SessionKey) -> io::Result<()>;
}

/// One file per entry inside a session directory
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: SessionKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl SessionBackend for FileBackend {
    fn read(&self, key: SessionKey) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: SessionKey, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        fs::write(&path, value)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn remove(&self, key: SessionKey) -> io::Result<()> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Process-local backend for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<SessionKey, String>>,
}

impl MemoryBackend {
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SessionKey, String>> {
        // a poisoned map still holds valid strings
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionBackend for MemoryBackend {
    fn read(&self, key: SessionKey) -> io::Result<Option<String>> {
        Ok(self.lock().get(&key).cloned())
    }

    fn write(&self, key: SessionKey, value: &str) -> io::Result<()> {
        self.lock().insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: SessionKey) -> io::Result<()> {
        self.lock().remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "subsphere-session-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_file_backend_round_trip() {
        let dir = scratch_dir("roundtrip");
        let backend = FileBackend::new(&dir);

        assert_eq!(backend.read(SessionKey::Token).unwrap(), None);
        backend.write(SessionKey::Token, "abc").unwrap();
        assert_eq!(backend.read(SessionKey::Token).unwrap().as_deref(), Some("abc"));
        assert!(dir.join("token").exists());

        backend.remove(SessionKey::Token).unwrap();
        backend.remove(SessionKey::Token).unwrap();
        assert_eq!(backend.read(SessionKey::Token).unwrap(), None);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_memory_backend() {
        let backend = MemoryBackend::default();
        assert!(backend.is_empty());
        backend.write(SessionKey::User, "{}").unwrap();
        assert_eq!(backend.len(), 1);
        backend.remove(SessionKey::User).unwrap();
        assert!(backend.is_empty());
    }
}
