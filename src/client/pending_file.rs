use std::io;
use std::path::{Path, PathBuf};

use super::FormError;
use crate::config::{DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_BYTES};
use crate::errors::ValidationError;
use crate::models::FileDescriptor;
use crate::utils::validation::{check_image_type, check_size};

/// A photo the prospect has picked but not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub display_name: String,
    pub byte_size: u64,
    pub mime_type: String,
    pub path: PathBuf,
}

impl PendingFile {
    pub fn new(
        display_name: impl Into<String>,
        byte_size: u64,
        mime_type: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            byte_size,
            mime_type: mime_type.into(),
            path: path.into(),
        }
    }

    /// Reads size from the file system and guesses the type from the
    /// extension.
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_guess::from_path(path).first_or_octet_stream();

        Ok(Self::new(
            display_name,
            metadata.len(),
            mime_type.essence_str(),
            path,
        ))
    }

    pub fn descriptor(&self) -> FileDescriptor {
        FileDescriptor {
            name: self.display_name.clone(),
            content_type: Some(self.mime_type.clone()),
            size: Some(self.byte_size),
        }
    }

    fn same_as(&self, other: &PendingFile) -> bool {
        self.display_name == other.display_name && self.byte_size == other.byte_size
    }
}

/// The form's selection, unique by `(name, size)` and capped in length.
#[derive(Debug, Clone)]
pub struct PendingFiles {
    files: Vec<PendingFile>,
    max_files: usize,
    max_file_bytes: u64,
}

impl Default for PendingFiles {
    fn default() -> Self {
        PendingFiles::new(DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_BYTES)
    }
}

impl PendingFiles {
    pub fn new(max_files: usize, max_file_bytes: u64) -> Self {
        PendingFiles {
            files: Vec::new(),
            max_files,
            max_file_bytes,
        }
    }

    /// Returns `Ok(false)` when an identical entry is already selected.
    /// Selections past the cap are rejected, never truncated.
    pub fn add(&mut self, file: PendingFile) -> Result<bool, ValidationError> {
        if self.files.iter().any(|existing| existing.same_as(&file)) {
            return Ok(false);
        }

        self.check(&file)?;
        if self.files.len() >= self.max_files {
            return Err(ValidationError::TooManyFiles {
                max: self.max_files,
            });
        }

        self.files.push(file);
        Ok(true)
    }

    pub fn remove(&mut self, index: usize) -> Option<PendingFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn as_slice(&self) -> &[PendingFile] {
        &self.files
    }

    /// Re-reads every file's size from disk and re-checks the selection.
    /// The returned snapshot carries the current sizes, so uploads declare
    /// the length that will actually be sent.
    pub async fn snapshot(&self) -> Result<Vec<PendingFile>, FormError> {
        if self.files.len() > self.max_files {
            return Err(ValidationError::TooManyFiles {
                max: self.max_files,
            }
            .into());
        }

        let mut current = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let metadata = tokio::fs::metadata(&file.path).await.map_err(|e| {
                FormError::Unreadable {
                    file: file.display_name.clone(),
                    reason: e.to_string(),
                }
            })?;
            let file = PendingFile {
                byte_size: metadata.len(),
                ..file.clone()
            };
            self.check(&file)?;
            current.push(file);
        }
        Ok(current)
    }

    fn check(&self, file: &PendingFile) -> Result<(), ValidationError> {
        check_size(&file.display_name, file.byte_size, self.max_file_bytes)?;
        check_image_type(&file.display_name, &file.mime_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(name: &str, size: u64) -> PendingFile {
        PendingFile::new(name, size, "image/jpeg", format!("/tmp/{}", name))
    }

    #[test]
    fn same_name_and_size_is_kept_once() {
        let mut files = PendingFiles::default();
        assert_eq!(files.add(jpeg("a.jpg", 100)), Ok(true));
        assert_eq!(files.add(jpeg("a.jpg", 100)), Ok(false));
        assert_eq!(files.len(), 1);

        assert_eq!(files.add(jpeg("a.jpg", 101)), Ok(true));
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn rejects_past_the_cap() {
        let mut files = PendingFiles::default();
        let results: Vec<_> = (0..25)
            .map(|i| files.add(jpeg(&format!("{}.jpg", i), 100)))
            .collect();

        assert!(results[..20].iter().all(|r| *r == Ok(true)));
        assert!(results[20..]
            .iter()
            .all(|r| *r == Err(ValidationError::TooManyFiles { max: 20 })));
        assert_eq!(files.len(), 20);
    }

    #[test]
    fn rejects_empty_oversized_and_non_images() {
        let mut files = PendingFiles::new(20, 1_000);
        assert_eq!(
            files.add(jpeg("empty.jpg", 0)),
            Err(ValidationError::EmptyFile("empty.jpg".to_string()))
        );
        assert!(matches!(
            files.add(jpeg("huge.jpg", 1_001)),
            Err(ValidationError::FileTooLarge { .. })
        ));
        assert!(matches!(
            files.add(PendingFile::new("notes.txt", 10, "text/plain", "/tmp/notes.txt")),
            Err(ValidationError::UnsupportedType { .. })
        ));
        assert!(files.is_empty());
    }

    #[test]
    fn remove_by_index() {
        let mut files = PendingFiles::default();
        files.add(jpeg("a.jpg", 1)).unwrap();
        files.add(jpeg("b.jpg", 1)).unwrap();

        assert_eq!(files.remove(5), None);
        assert_eq!(files.remove(0).map(|f| f.display_name), Some("a.jpg".to_string()));
        assert_eq!(files.as_slice()[0].display_name, "b.jpg");
    }

    #[tokio::test]
    async fn from_path_reads_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terrace.png");
        tokio::fs::write(&path, b"\x89PNG fake").await.unwrap();

        let file = PendingFile::from_path(&path).await.unwrap();
        assert_eq!(file.display_name, "terrace.png");
        assert_eq!(file.byte_size, 9);
        assert_eq!(file.mime_type, "image/png");
    }

    #[tokio::test]
    async fn snapshot_sees_files_emptied_after_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.jpg");
        tokio::fs::write(&path, b"abc").await.unwrap();

        let mut files = PendingFiles::default();
        files.add(PendingFile::from_path(&path).await.unwrap()).unwrap();
        tokio::fs::write(&path, b"").await.unwrap();

        match files.snapshot().await {
            Err(FormError::Invalid(ValidationError::EmptyFile(name))) => {
                assert_eq!(name, "pool.jpg")
            }
            other => panic!("expected empty file error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn snapshot_uses_current_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.jpg");
        tokio::fs::write(&path, b"abc").await.unwrap();

        let mut files = PendingFiles::default();
        files.add(PendingFile::from_path(&path).await.unwrap()).unwrap();
        tokio::fs::write(&path, b"abcdef").await.unwrap();

        let current = files.snapshot().await.unwrap();
        assert_eq!(current[0].byte_size, 6);
        assert_eq!(files.as_slice()[0].byte_size, 3);
    }

    #[tokio::test]
    async fn snapshot_reports_missing_files() {
        let mut files = PendingFiles::default();
        files
            .add(PendingFile::new("gone.jpg", 10, "image/jpeg", "/nonexistent/gone.jpg"))
            .unwrap();

        assert!(matches!(
            files.snapshot().await,
            Err(FormError::Unreadable { ref file, .. }) if file == "gone.jpg"
        ));
    }
}
