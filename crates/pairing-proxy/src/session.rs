//! Per-request session directories.

use chrono::Utc;
use rand::Rng;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::task::spawn_blocking;
use tracing::{debug, info};

const BASE36: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h',
    'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

const SUFFIX_LEN: usize = 7;

/// Session identifier: `<unix millis>_<7 base36 chars>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())])
            .collect();

        Self(format!("{}_{}", Utc::now().timestamp_millis(), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory name for this session.
    pub fn dir_name(&self) -> String {
        format!("session_{}", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A session directory, removed by [`SessionDir::close`] or on drop unless
/// [`SessionDir::retain`] is called.
///
/// Creation and `close` run on the blocking pool. Drop removes the directory
/// synchronously and only covers early returns on error.
#[derive(Debug)]
pub struct SessionDir {
    id: SessionId,
    dir: TempDir,
}

impl SessionDir {
    /// Create `session_<id>` under `root`, creating `root` if needed. Fails
    /// if the directory already exists.
    pub async fn create(root: &Path, id: SessionId) -> io::Result<Self> {
        let root = root.to_path_buf();
        let name = id.dir_name();

        let dir = spawn_blocking(move || {
            std::fs::create_dir_all(&root)?;
            tempfile::Builder::new()
                .prefix(&name)
                .rand_bytes(0)
                .tempdir_in(&root)
        })
        .await
        .map_err(io::Error::other)??;

        debug!(session_id = %id, path = %dir.path().display(), "Session directory created");
        Ok(Self { id, dir })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory and everything in it.
    pub async fn close(self) -> io::Result<()> {
        let SessionDir { id, dir } = self;

        spawn_blocking(move || dir.close())
            .await
            .map_err(io::Error::other)??;

        debug!(session_id = %id, "Session directory removed");
        Ok(())
    }

    /// Keep the directory on disk and return its path.
    pub fn retain(self) -> PathBuf {
        info!(session_id = %self.id, "Retaining session directory");
        self.dir.keep()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_format() {
        let id = SessionId::generate();
        let (millis, suffix) = id.as_str().split_once('_').unwrap();

        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| BASE36.contains(&c)));
        assert_eq!(id.dir_name(), format!("session_{}", id));
    }

    #[test]
    fn test_session_ids_are_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_dir_removed_on_drop() {
        let root = TempDir::new().unwrap();
        let id = SessionId::generate();

        let session = SessionDir::create(root.path(), id.clone()).await.unwrap();
        let path = session.path().to_path_buf();
        assert_eq!(path, root.path().join(id.dir_name()));
        assert!(path.is_dir());

        drop(session);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_close_removes_dir_and_contents() {
        let root = TempDir::new().unwrap();
        let session = SessionDir::create(root.path(), SessionId::generate())
            .await
            .unwrap();
        let path = session.path().to_path_buf();
        std::fs::write(path.join("creds.json"), b"{}").unwrap();

        session.close().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_retain_keeps_dir() {
        let root = TempDir::new().unwrap();
        let session = SessionDir::create(root.path(), SessionId::generate())
            .await
            .unwrap();

        let path = session.retain();
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_create_nested_root() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("a").join("b");

        let session = SessionDir::create(&nested, SessionId::generate())
            .await
            .unwrap();
        assert!(session.path().starts_with(&nested));
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let root = TempDir::new().unwrap();
        let id = SessionId::generate();

        let _first = SessionDir::create(root.path(), id.clone()).await.unwrap();
        assert!(SessionDir::create(root.path(), id).await.is_err());
    }
}
