use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use super::MediaContainer;

/// Minimal metadata derived from a local video file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// File name as supplied by the caller
    pub title: String,
    /// Size in bytes
    pub file_size: u64,
    /// Declared content type
    pub content_type: String,
}

/// Check if the file exists and is non-empty
pub async fn validate_file(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("Path is not a file: {}", path.display());
    }

    match fs::metadata(path).await {
        Ok(metadata) => {
            if metadata.len() == 0 {
                anyhow::bail!("File is empty: {}", path.display());
            }
        }
        Err(e) => {
            anyhow::bail!("Cannot access file {}: {}", path.display(), e);
        }
    }

    Ok(())
}

/// Describe a local file without any external lookup.
///
/// `title` and `content_type` override what the path would imply, which is how
/// uploads keep the caller's original file name and declared type.
pub async fn describe_file(
    path: &Path,
    container: MediaContainer,
    title: Option<&str>,
    content_type: Option<&str>,
) -> Result<FileMetadata> {
    let metadata = fs::metadata(path).await?;

    let title = title
        .map(str::to_string)
        .or_else(|| path.file_name().and_then(|s| s.to_str()).map(str::to_string))
        .unwrap_or_else(|| "Local File".to_string());

    Ok(FileMetadata {
        title,
        file_size: metadata.len(),
        content_type: content_type
            .map(str::to_string)
            .unwrap_or_else(|| container.mime_type().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_file_rejects_missing_and_empty() {
        assert!(validate_file(Path::new("/definitely/not/here.mp4")).await.is_err());

        let empty = NamedTempFile::new().unwrap();
        let err = validate_file(empty.path()).await.unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[tokio::test]
    async fn test_describe_file_uses_name_size_and_mime() {
        let file = tempfile::Builder::new().suffix(".mov").tempfile().unwrap();
        fs_err::write(file.path(), vec![0u8; 2048]).unwrap();

        let metadata = describe_file(file.path(), MediaContainer::Mov, None, None).await.unwrap();
        assert_eq!(metadata.file_size, 2048);
        assert_eq!(metadata.content_type, "video/quicktime");
        assert!(metadata.title.ends_with(".mov"));

        let upload = describe_file(file.path(), MediaContainer::Mov, Some("holiday.mov"), Some("application/octet-stream"))
            .await
            .unwrap();
        assert_eq!(upload.title, "holiday.mov");
        assert_eq!(upload.content_type, "application/octet-stream");
    }
}
