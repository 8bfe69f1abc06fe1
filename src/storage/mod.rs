use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::pipeline::SummaryRecord;
use crate::Result;

/// Storage for finished summary records, swappable per deployment
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Store a record, replacing any record with the same id
    async fn put(&self, record: SummaryRecord) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<SummaryRecord>>;

    /// All records, oldest first
    async fn list(&self) -> Result<Vec<SummaryRecord>>;

    /// Remove a record; returns whether one existed
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Process-lifetime store kept in insertion order
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<SummaryRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SummaryStore for InMemoryStore {
    async fn put(&self, record: SummaryRecord) -> Result<()> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<SummaryRecord>> {
        Ok(self.records.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<SummaryRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }
}

/// One pretty-printed JSON file per record under a directory
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            anyhow::bail!("Invalid summary id: {:?}", id);
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }

    fn read_record(path: &Path) -> Result<SummaryRecord> {
        let content = fs_err::read_to_string(path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse summary record {}", path.display()))
    }
}

#[async_trait]
impl SummaryStore for JsonDirStore {
    async fn put(&self, record: SummaryRecord) -> Result<()> {
        let path = self.record_path(&record.id)?;
        fs_err::create_dir_all(&self.dir)?;

        let content =
            serde_json::to_string_pretty(&record).context("Failed to serialize summary record")?;
        fs_err::write(&path, content).context("Failed to write summary record")?;

        tracing::debug!("Stored summary {} at {}", record.id, path.display());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<SummaryRecord>> {
        let path = self.record_path(id)?;
        if !path.exists() {
            return Ok(None);
        }
        Self::read_record(&path).map(Some)
    }

    async fn list(&self) -> Result<Vec<SummaryRecord>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in fs_err::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_record(&path) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping unreadable summary record: {:#}", e),
            }
        }

        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let path = self.record_path(id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs_err::remove_file(&path)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::local::FileMetadata;
    use crate::pipeline::RecordMetadata;
    use crate::transcribe::TranscriptSource;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, minute: u32) -> SummaryRecord {
        SummaryRecord {
            id: id.to_string(),
            summary: format!("summary {}", id),
            metadata: RecordMetadata::File(FileMetadata {
                title: "talk.mp4".to_string(),
                file_size: 1024,
                content_type: "video/mp4".to_string(),
            }),
            transcript: "Hello world.".to_string(),
            transcript_source: TranscriptSource::SpeechToText,
            sentiment: None,
            keywords: Some(vec!["hello".to_string(), "world".to_string()]),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_in_memory_store_keeps_insertion_order() {
        let store = InMemoryStore::new();
        store.put(record("b", 2)).await.unwrap();
        store.put(record("a", 1)).await.unwrap();

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(store.get("a").await.unwrap().unwrap().summary, "summary a");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_store_delete() {
        let store = InMemoryStore::new();
        tokio_test::assert_ok!(store.put(record("a", 1)).await);

        assert!(tokio_test::assert_ok!(store.delete("a").await));
        assert!(!store.delete("a").await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json_dir_store_roundtrip_sorted_by_creation() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::new(dir.path().join("summaries"));
        assert!(store.list().await.unwrap().is_empty());

        store.put(record("late", 30)).await.unwrap();
        store.put(record("early", 5)).await.unwrap();

        let listed = store.list().await.unwrap();
        let ids: Vec<_> = listed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
        assert_eq!(store.get("late").await.unwrap(), Some(record("late", 30)));
    }

    #[tokio::test]
    async fn test_json_dir_store_delete_and_skip_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::new(dir.path());
        store.put(record("a", 1)).await.unwrap();
        fs_err::write(dir.path().join("notes.txt"), "not a record").unwrap();
        fs_err::write(dir.path().join("broken.json"), "{").unwrap();

        assert_eq!(store.list().await.unwrap().len(), 1);
        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_json_dir_store_rejects_path_like_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::new(dir.path());
        assert!(store.get("../etc/passwd").await.is_err());
    }
}
