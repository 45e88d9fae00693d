//! Document storage: remote share store + local files
//!
//! The codec is the only caller: remote lookups and local loads both end
//! in `codec::decode_value`.

use std::future::Future;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::core::codec::{self, Document, ImportedSession};
use crate::error::{StoreError, TransferError};
use crate::types::Session;

/// Lookup-by-identifier and write for shared recordings
pub trait RemoteStore {
    /// Zero or one raw document for `hash`
    fn lookup(&self, hash: &str) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    /// Store a document, returning its share identifier
    fn write(&self, document: &Document) -> impl Future<Output = Result<String, StoreError>> + Send;
}

/// Body returned by the share server on write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareResponse {
    pub hash: String,
    pub url: String,
}

// =============================================================================
// DIRECTORY STORE
// =============================================================================

/// One `<hash>.json` file per shared document
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    dir: PathBuf,
}

impl DirectoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, hash: &str) -> PathBuf {
        self.dir.join(format!("{}.json", hash))
    }
}

impl RemoteStore for DirectoryStore {
    async fn lookup(&self, hash: &str) -> Result<Option<Value>, StoreError> {
        // Anything else could escape the directory
        if !codec::is_share_hash(hash) {
            return Ok(None);
        }
        let path = self.path_for(hash);
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    async fn write(&self, document: &Document) -> Result<String, StoreError> {
        let hash = codec::share_hash(document);
        let mut stored = document.clone();
        stored.hash = Some(hash.clone());

        let json = serde_json::to_string_pretty(&stored)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io { path: self.dir.clone(), source })?;
        let path = self.path_for(&hash);
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| StoreError::Io { path, source })?;
        Ok(hash)
    }
}

// =============================================================================
// HTTP STORE
// =============================================================================

/// Client of a share server (`core::api`)
#[derive(Debug, Clone)]
pub struct HttpStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Link that opens a shared recording
    pub fn share_url(&self, hash: &str) -> String {
        format!("{}/scores/{}", self.base_url, hash)
    }
}

impl RemoteStore for HttpStore {
    async fn lookup(&self, hash: &str) -> Result<Option<Value>, StoreError> {
        let response = self.client.get(self.share_url(hash)).send().await?;
        match response.status() {
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(StoreError::Status { status: status.as_u16() }),
        }
    }

    async fn write(&self, document: &Document) -> Result<String, StoreError> {
        let response = self
            .client
            .post(format!("{}/scores", self.base_url))
            .json(document)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status { status: status.as_u16() });
        }
        let share: ShareResponse = response.json().await?;
        Ok(share.hash)
    }
}

// =============================================================================
// TRANSFER OPERATIONS
// =============================================================================

/// Share a session; the assigned identifier is written back into its metadata
pub async fn export_remote<S: RemoteStore>(store: &S, session: &mut Session) -> Result<String, TransferError> {
    let document = codec::serialize(session);
    let hash = store.write(&document).await?;
    info!(%hash, entries = document.entries.len(), "recording shared");
    session.metadata.share_hash = Some(hash.clone());
    Ok(hash)
}

/// Fetch and validate a shared recording
pub async fn fetch_remote<S: RemoteStore>(store: &S, hash: &str) -> Result<ImportedSession, TransferError> {
    let value = store
        .lookup(hash)
        .await?
        .ok_or_else(|| TransferError::NotFound { hash: hash.to_string() })?;
    Ok(codec::decode_value(&value)?)
}

/// Default file name for a recording
pub fn document_file_name(document: &Document) -> String {
    format!("scores_{}.json", document.video_id)
}

/// Save document to JSON file in `dir`, returning the path
pub fn save_document(document: &Document, dir: &Path) -> Result<PathBuf, TransferError> {
    let path = dir.join(document_file_name(document));
    let json = serde_json::to_string_pretty(document)?;

    std::fs::create_dir_all(dir).map_err(|source| TransferError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    std::fs::write(&path, json).map_err(|source| TransferError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Load and validate a document from a JSON file
pub fn load_document(path: &Path) -> Result<ImportedSession, TransferError> {
    let json = std::fs::read_to_string(path).map_err(|source| TransferError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(codec::decode_str(&json)?)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::types::Sign;

    fn session_with_clicks() -> Session {
        let mut session = Session::default();
        session.timeline.upsert(3.0, Sign::Positive);
        session.timeline.upsert(9.5, Sign::Negative);
        session
    }

    #[tokio::test]
    async fn test_export_then_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let mut session = session_with_clicks();

        let hash = export_remote(&store, &mut session).await.unwrap();
        assert_eq!(session.metadata.share_hash.as_deref(), Some(hash.as_str()));

        let imported = fetch_remote(&store, &hash).await.unwrap();
        assert_eq!(imported.timeline, session.timeline);
        assert_eq!(imported.share_hash, Some(hash));
    }

    #[tokio::test]
    async fn test_fetch_unknown_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());

        let err = fetch_remote(&store, "0123456789abcdef01234567").await.unwrap_err();
        assert!(matches!(err, TransferError::NotFound { ref hash } if hash == "0123456789abcdef01234567"));
        assert!(err.to_string().contains("0123456789abcdef01234567"));

        let err = fetch_remote(&store, "../../etc/passwd").await.unwrap_err();
        assert!(matches!(err, TransferError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_remote_documents_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let hash = "aaaaaaaaaaaaaaaaaaaaaaaa";
        std::fs::write(
            dir.path().join(format!("{}.json", hash)),
            r#"{"videoId":"x","videoUrl":"y","entries":[[5,1],[3,1]]}"#,
        )
        .unwrap();

        let err = fetch_remote(&store, hash).await.unwrap_err();
        assert!(matches!(
            err,
            TransferError::Validation(ValidationError::TimesNotIncreasing { .. })
        ));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_with_clicks();
        let document = codec::serialize(&session);

        let path = save_document(&document, dir.path()).unwrap();
        assert!(path.ends_with("scores_Hnn_-y59a84.json"));

        let imported = load_document(&path).unwrap();
        assert_eq!(imported.to_document(), document);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_document(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, TransferError::Io { .. }));
    }
}
