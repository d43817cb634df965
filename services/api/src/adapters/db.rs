//! services/api/src/adapters/db.rs
//!
//! This module contains the Postgres adapter for the `DocumentRepository` port.
//! The whole collection lives as one JSONB value in a keyed storage slot.

use crate::wire::{documents_from_records, records_from_documents, DocumentRecord};
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use study_companion_core::domain::Document;
use study_companion_core::ports::{DocumentRepository, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DocumentRepository` port.
#[derive(Clone)]
pub struct PgSlotRepository {
    pool: PgPool,
    key: String,
}

impl PgSlotRepository {
    /// Creates a new `PgSlotRepository` reading and writing the slot named `key`.
    pub fn new(pool: PgPool, key: impl Into<String>) -> Self {
        Self {
            pool,
            key: key.into(),
        }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct SlotRecord {
    value: Json<Vec<DocumentRecord>>,
}

impl SlotRecord {
    fn to_domain(self) -> PortResult<Vec<Document>> {
        documents_from_records(self.value.0)
    }
}

//=========================================================================================
// `DocumentRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentRepository for PgSlotRepository {
    async fn load(&self) -> PortResult<Vec<Document>> {
        let record = sqlx::query_as::<_, SlotRecord>("SELECT value FROM storage_slots WHERE key = $1")
            .bind(&self.key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        match record {
            Some(record) => record.to_domain(),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, snapshot: &[Document]) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO storage_slots (key, value, updated_at) VALUES ($1, $2, now()) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
        )
        .bind(&self.key)
        .bind(Json(records_from_documents(snapshot)))
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
