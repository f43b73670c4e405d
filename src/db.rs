use crate::records::InfoRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("record with unique id '{0}' already exists")]
    Duplicate(String),
}

/// Persistence for info records.
///
/// Every admin-facing lookup is scoped by `admin_id`; only the public view
/// lookup goes by `unique_id` alone.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, record: &InfoRecord) -> Result<(), StoreError>;

    /// Records owned by `admin_id`, newest first
    async fn list_by_admin(&self, admin_id: Uuid) -> Result<Vec<InfoRecord>, StoreError>;

    async fn find_active_by_unique_id(
        &self,
        unique_id: &str,
    ) -> Result<Option<InfoRecord>, StoreError>;

    async fn find_for_admin(
        &self,
        id: Uuid,
        admin_id: Uuid,
    ) -> Result<Option<InfoRecord>, StoreError>;

    /// Persist changed fields of an existing record
    async fn update(&self, record: &InfoRecord) -> Result<(), StoreError>;

    /// Returns false when no record matched
    async fn delete_for_admin(&self, id: Uuid, admin_id: Uuid) -> Result<bool, StoreError>;
}

/// Process-local store, used when no `DATABASE_URL` is configured and in tests.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Uuid, InfoRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, record: &InfoRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.values().any(|r| r.unique_id == record.unique_id) {
            return Err(StoreError::Duplicate(record.unique_id.clone()));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn list_by_admin(&self, admin_id: Uuid) -> Result<Vec<InfoRecord>, StoreError> {
        let records = self.records.read().await;
        let mut owned: Vec<InfoRecord> = records
            .values()
            .filter(|r| r.admin_id == admin_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn find_active_by_unique_id(
        &self,
        unique_id: &str,
    ) -> Result<Option<InfoRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|r| r.unique_id == unique_id && r.is_active)
            .cloned())
    }

    async fn find_for_admin(
        &self,
        id: Uuid,
        admin_id: Uuid,
    ) -> Result<Option<InfoRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .get(&id)
            .filter(|r| r.admin_id == admin_id)
            .cloned())
    }

    async fn update(&self, record: &InfoRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if let Some(existing) = records.get_mut(&record.id) {
            *existing = record.clone();
        }
        Ok(())
    }

    async fn delete_for_admin(&self, id: Uuid, admin_id: Uuid) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        match records.get(&id) {
            Some(r) if r.admin_id == admin_id => {
                records.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

const RECORD_COLUMNS: &str = "id, medicine_name, usage, dosage, exp, man, price, btno, \
     comp_name, instr, drugs, admin_id, qr_code_url, qr_code_image, unique_id, \
     view_count, last_viewed, is_active, created_at, updated_at";

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and create the `info_records` table if it does not exist yet.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS info_records (
                id UUID PRIMARY KEY,
                medicine_name TEXT NOT NULL,
                usage TEXT NOT NULL,
                dosage TEXT NOT NULL,
                exp TEXT NOT NULL,
                man TEXT NOT NULL,
                price TEXT NOT NULL,
                btno TEXT NOT NULL,
                comp_name TEXT NOT NULL,
                instr TEXT NOT NULL,
                drugs TEXT NOT NULL,
                admin_id UUID NOT NULL,
                qr_code_url TEXT NOT NULL,
                qr_code_image TEXT,
                unique_id TEXT NOT NULL UNIQUE,
                view_count INTEGER NOT NULL DEFAULT 0,
                last_viewed TIMESTAMPTZ,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .context("Failed to create info_records table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS info_records_admin_created
             ON info_records (admin_id, created_at DESC)",
        )
        .execute(&pool)
        .await
        .context("Failed to create info_records index")?;

        info!("✓ Connected to PostgreSQL");
        Ok(Self { pool })
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn insert(&self, record: &InfoRecord) -> Result<(), StoreError> {
        let result = sqlx::query(&format!(
            "INSERT INTO info_records ({}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)",
            RECORD_COLUMNS
        ))
        .bind(record.id)
        .bind(&record.medicine_name)
        .bind(&record.usage)
        .bind(&record.dosage)
        .bind(&record.exp)
        .bind(&record.man)
        .bind(&record.price)
        .bind(&record.btno)
        .bind(&record.comp_name)
        .bind(&record.instr)
        .bind(&record.drugs)
        .bind(record.admin_id)
        .bind(&record.qr_code_url)
        .bind(&record.qr_code_image)
        .bind(&record.unique_id)
        .bind(record.view_count)
        .bind(record.last_viewed)
        .bind(record.is_active)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::Duplicate(record.unique_id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_by_admin(&self, admin_id: Uuid) -> Result<Vec<InfoRecord>, StoreError> {
        let records = sqlx::query_as::<_, InfoRecord>(&format!(
            "SELECT {} FROM info_records WHERE admin_id = $1 ORDER BY created_at DESC",
            RECORD_COLUMNS
        ))
        .bind(admin_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn find_active_by_unique_id(
        &self,
        unique_id: &str,
    ) -> Result<Option<InfoRecord>, StoreError> {
        let record = sqlx::query_as::<_, InfoRecord>(&format!(
            "SELECT {} FROM info_records WHERE unique_id = $1 AND is_active",
            RECORD_COLUMNS
        ))
        .bind(unique_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn find_for_admin(
        &self,
        id: Uuid,
        admin_id: Uuid,
    ) -> Result<Option<InfoRecord>, StoreError> {
        let record = sqlx::query_as::<_, InfoRecord>(&format!(
            "SELECT {} FROM info_records WHERE id = $1 AND admin_id = $2",
            RECORD_COLUMNS
        ))
        .bind(id)
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn update(&self, record: &InfoRecord) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE info_records SET
                medicine_name = $2, usage = $3, dosage = $4, exp = $5, man = $6,
                price = $7, btno = $8, comp_name = $9, instr = $10, drugs = $11,
                is_active = $12, updated_at = $13
             WHERE id = $1",
        )
        .bind(record.id)
        .bind(&record.medicine_name)
        .bind(&record.usage)
        .bind(&record.dosage)
        .bind(&record.exp)
        .bind(&record.man)
        .bind(&record.price)
        .bind(&record.btno)
        .bind(&record.comp_name)
        .bind(&record.instr)
        .bind(&record.drugs)
        .bind(record.is_active)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_for_admin(&self, id: Uuid, admin_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM info_records WHERE id = $1 AND admin_id = $2")
            .bind(id)
            .bind(admin_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
