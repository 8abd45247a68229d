//! SQLite-backed storage.
//!
//! `Database` owns the connection pool; queries hang off it in
//! `queries.rs`. The `LicenseStore` impl below bridges the licensing
//! crate's store seam onto the pool, so every request runs against a
//! pooled connection acquired per query and released on all exit paths.

mod db;
mod models;
mod queries;

pub use db::{Database, DatabaseError};
pub use models::{CaptionRow, LicenseRow};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use caption_licensing::{LicenseError, LicenseKey, LicenseRecord, LicenseStore};

impl From<DatabaseError> for LicenseError {
    fn from(e: DatabaseError) -> Self {
        Self::Storage(e.to_string())
    }
}

#[async_trait]
impl LicenseStore for Database {
    async fn get(&self, key: &LicenseKey) -> Result<Option<LicenseRecord>, LicenseError> {
        let row = self.get_license(key.as_str()).await?;
        Ok(row.map(LicenseRecord::from))
    }

    async fn insert(&self, record: &LicenseRecord) -> Result<(), LicenseError> {
        self.insert_license(
            &record.email,
            record.key.as_str(),
            record.active_until,
            record.created_at,
        )
        .await?;
        Ok(())
    }

    async fn set_active_until(
        &self,
        key: &LicenseKey,
        active_until: DateTime<Utc>,
    ) -> Result<(), LicenseError> {
        self.update_license_active_until(key.as_str(), active_until)
            .await?;
        Ok(())
    }
}
