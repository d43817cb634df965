//! services/api/src/adapters/json_store.rs
//!
//! A `DocumentRepository` backed by a single JSON file holding the whole
//! collection, rewritten atomically on every save.

use crate::wire::{documents_from_records, records_from_documents, DocumentRecord};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use study_companion_core::domain::Document;
use study_companion_core::ports::{DocumentRepository, PortError, PortResult};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "documents.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl DocumentRepository for JsonFileRepository {
    /// A missing file is an empty collection.
    async fn load(&self) -> PortResult<Vec<Document>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No document file at {}; starting empty.", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(PortError::Unexpected(e.to_string())),
        };

        let records: Vec<DocumentRecord> = serde_json::from_slice(&bytes).map_err(|e| {
            PortError::Unexpected(format!(
                "Malformed document file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        documents_from_records(records)
    }

    async fn save(&self, snapshot: &[Document]) -> PortResult<()> {
        let json = serde_json::to_vec(&records_from_documents(snapshot))
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, json)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_companion_core::domain::{Flashcard, GeneratedOutputs};
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_document() -> Document {
        let card = Flashcard::new(
            "What is a mammal?".into(),
            "A warm-blooded vertebrate.".into(),
            "Mammals are warm-blooded.".into(),
            vec!["Fish".into(), "Mammal".into(), "Bird".into(), "Insect".into()],
            1,
        )
        .unwrap();
        Document {
            id: Uuid::new_v4(),
            name: "biology.txt".into(),
            created_at: Utc::now(),
            word_count: 4,
            content: "Cats are warm-blooded mammals".into(),
            outputs: GeneratedOutputs {
                summary: Some("## Intro\nCats".into()),
                flashcards: Some(vec![card]),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("documents.json"));
        assert!(repo.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn saved_collection_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("nested/documents.json"));
        let document = sample_document();

        repo.save(std::slice::from_ref(&document)).await.unwrap();
        let loaded = repo.load().await.unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, document.id);
        assert_eq!(loaded[0].outputs, document.outputs);
        assert!(!repo.temp_path().exists());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.json");
        std::fs::write(&path, b"{ not json").unwrap();
        assert!(JsonFileRepository::new(path).load().await.is_err());
    }
}
