use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Extensions accepted by the upload surface, matched case-insensitively
/// against the final extension only.
const ALLOWED_EXTENSIONS: &[&str] = &["pdf"];

#[derive(Error, Debug)]
pub enum FileError {
    #[error("No selected file")]
    EmptyFileName,

    #[error("File type not allowed")]
    DisallowedExtension,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error occurred: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to persist file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// One published generation of uploaded documents. The directory holds
/// exactly the files in `file_names`, in submission order.
#[derive(Debug, Clone)]
pub struct UploadBatch {
    pub id: String,
    pub dir: PathBuf,
    pub file_names: Vec<String>,
}

/// On-disk store for uploaded PDFs. Every upload becomes its own batch
/// directory under `<data_dir>/uploads/`, so replacing the active batch is a
/// pointer swap rather than an in-place rewrite.
#[derive(Clone, Debug)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub async fn new(data_dir: &str) -> Result<Self, FileError> {
        let root = Path::new(data_dir).join("uploads");
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Checks a client-supplied filename against the allowed extension set
    /// and returns its sanitized form. Runs before any write happens.
    pub fn validate_file_name(file_name: &str) -> Result<String, FileError> {
        if file_name.trim().is_empty() {
            return Err(FileError::EmptyFileName);
        }

        let extension = file_name
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_ascii_lowercase())
            .ok_or(FileError::DisallowedExtension)?;

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(FileError::DisallowedExtension);
        }

        Ok(Self::sanitize_file_name(file_name))
    }

    /// Sanitizes the file name to prevent directory traversal. Replaces any
    /// non-alphanumeric characters (excluding '_') in the stem with
    /// underscores; the validated extension is kept as-is.
    fn sanitize_file_name(file_name: &str) -> String {
        if let Some(idx) = file_name.rfind('.') {
            let (name, ext) = file_name.split_at(idx);
            let sanitized_name: String = name
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        c
                    } else {
                        '_'
                    }
                })
                .collect();
            format!("{sanitized_name}{ext}")
        } else {
            file_name
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        c
                    } else {
                        '_'
                    }
                })
                .collect()
        }
    }

    /// Persists a validated set of files into a fresh batch directory. The
    /// batch is not visible to readers until the caller publishes it.
    pub async fn stage_batch(
        &self,
        files: Vec<(String, NamedTempFile)>,
    ) -> Result<UploadBatch, FileError> {
        let id = Uuid::new_v4().to_string();
        let dir = self.root.join(&id);
        tokio::fs::create_dir_all(&dir).await?;

        let mut file_names = Vec::with_capacity(files.len());
        for (file_name, file) in files {
            let final_path = dir.join(&file_name);
            file.persist(&final_path)?;
            file_names.push(file_name);
        }

        info!(batch_id = %id, files = file_names.len(), "Staged upload batch");

        Ok(UploadBatch {
            id,
            dir,
            file_names,
        })
    }

    /// Removes a batch from disk, best-effort: per-file failures are logged
    /// and skipped, never surfaced to the caller.
    pub async fn remove_batch(&self, batch: &UploadBatch) {
        if !batch.dir.starts_with(&self.root) {
            warn!(dir = ?batch.dir, "Refusing to remove directory outside the store");
            return;
        }

        for file_name in &batch.file_names {
            let path = batch.dir.join(file_name);
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!("Failed to delete {:?}. Reason: {}", path, e);
            }
        }

        if let Err(e) = tokio::fs::remove_dir_all(&batch.dir).await {
            warn!("Failed to delete {:?}. Reason: {}", batch.dir, e);
        } else {
            info!(batch_id = %batch.id, "Removed upload batch");
        }
    }

    /// Reads the raw bytes of a document in the given batch. The name must
    /// match one of the batch's stored (sanitized) filenames, which also
    /// rules out traversal outside the batch directory.
    pub async fn read_document(
        &self,
        batch: &UploadBatch,
        file_name: &str,
    ) -> Result<Vec<u8>, FileError> {
        if !batch.file_names.iter().any(|name| name == file_name) {
            return Err(FileError::FileNotFound(file_name.to_string()));
        }

        let path = batch.dir.join(file_name);
        Ok(tokio::fs::read(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file_with(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content).expect("Failed to write temp file");
        file
    }

    async fn test_store() -> (tempfile::TempDir, DocumentStore) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = DocumentStore::new(&dir.path().to_string_lossy())
            .await
            .expect("Failed to create store");
        (dir, store)
    }

    #[test]
    fn test_validate_accepts_pdf_case_insensitive() {
        assert_eq!(
            DocumentStore::validate_file_name("report.pdf").expect("valid"),
            "report.pdf"
        );
        assert_eq!(
            DocumentStore::validate_file_name("REPORT.PDF").expect("valid"),
            "REPORT.PDF"
        );
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        assert!(matches!(
            DocumentStore::validate_file_name(""),
            Err(FileError::EmptyFileName)
        ));
        assert!(matches!(
            DocumentStore::validate_file_name("   "),
            Err(FileError::EmptyFileName)
        ));
    }

    #[test]
    fn test_validate_rejects_disallowed_extension() {
        assert!(matches!(
            DocumentStore::validate_file_name("notes.txt"),
            Err(FileError::DisallowedExtension)
        ));
        assert!(matches!(
            DocumentStore::validate_file_name("no_extension"),
            Err(FileError::DisallowedExtension)
        ));
    }

    #[test]
    fn test_validate_only_checks_final_extension() {
        // single-extension check: only the last segment counts
        assert!(DocumentStore::validate_file_name("archive.tar.pdf").is_ok());
        assert!(matches!(
            DocumentStore::validate_file_name("report.pdf.txt"),
            Err(FileError::DisallowedExtension)
        ));
    }

    #[test]
    fn test_sanitize_neutralizes_traversal() {
        assert_eq!(
            DocumentStore::validate_file_name("../../evil.pdf").expect("valid"),
            "______evil.pdf"
        );
        assert_eq!(
            DocumentStore::validate_file_name("my report.pdf").expect("valid"),
            "my_report.pdf"
        );
    }

    #[tokio::test]
    async fn test_stage_and_read_round_trip() {
        let (_guard, store) = test_store().await;
        let content = b"%PDF-1.5 test bytes";

        let batch = store
            .stage_batch(vec![("a.pdf".to_string(), temp_file_with(content))])
            .await
            .expect("Failed to stage batch");

        assert_eq!(batch.file_names, vec!["a.pdf".to_string()]);
        let read_back = store
            .read_document(&batch, "a.pdf")
            .await
            .expect("Failed to read document");
        assert_eq!(read_back, content);
    }

    #[tokio::test]
    async fn test_read_unknown_name_is_not_found() {
        let (_guard, store) = test_store().await;
        let batch = store
            .stage_batch(vec![("a.pdf".to_string(), temp_file_with(b"x"))])
            .await
            .expect("Failed to stage batch");

        assert!(matches!(
            store.read_document(&batch, "b.pdf").await,
            Err(FileError::FileNotFound(_))
        ));
        // traversal names never match the stored list
        assert!(matches!(
            store.read_document(&batch, "../a.pdf").await,
            Err(FileError::FileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_batch_clears_directory() {
        let (_guard, store) = test_store().await;
        let batch = store
            .stage_batch(vec![("a.pdf".to_string(), temp_file_with(b"x"))])
            .await
            .expect("Failed to stage batch");

        assert!(tokio::fs::try_exists(&batch.dir).await.unwrap_or(false));
        store.remove_batch(&batch).await;
        assert!(!tokio::fs::try_exists(&batch.dir).await.unwrap_or(true));
    }

    #[tokio::test]
    async fn test_remove_batch_outside_root_is_refused() {
        let (_guard, store) = test_store().await;
        let other = tempfile::tempdir().expect("Failed to create temp dir");
        let foreign = UploadBatch {
            id: "foreign".to_string(),
            dir: other.path().to_path_buf(),
            file_names: vec![],
        };

        store.remove_batch(&foreign).await;
        assert!(tokio::fs::try_exists(other.path()).await.unwrap_or(false));
    }
}
