//! License Storage
//!
//! The store seam the lifecycle manager runs against. Production uses
//! the SQLite-backed database in the server crate; `MemoryLicenseStore`
//! backs unit tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::license::{LicenseKey, LicenseRecord};

/// License storage trait
#[async_trait]
pub trait LicenseStore: Send + Sync {
    /// Get a license by key
    async fn get(&self, key: &LicenseKey) -> Result<Option<LicenseRecord>>;

    /// Insert a new license
    async fn insert(&self, record: &LicenseRecord) -> Result<()>;

    /// Overwrite `active_until` for an existing license. No-op for a
    /// key with no record.
    async fn set_active_until(
        &self,
        key: &LicenseKey,
        active_until: DateTime<Utc>,
    ) -> Result<()>;
}

/// In-memory license store (for tests and development)
#[derive(Default)]
pub struct MemoryLicenseStore {
    licenses: RwLock<HashMap<LicenseKey, LicenseRecord>>,
}

impl MemoryLicenseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LicenseStore for MemoryLicenseStore {
    async fn get(&self, key: &LicenseKey) -> Result<Option<LicenseRecord>> {
        let licenses = self.licenses.read().unwrap();
        Ok(licenses.get(key).cloned())
    }

    async fn insert(&self, record: &LicenseRecord) -> Result<()> {
        let mut licenses = self.licenses.write().unwrap();
        licenses.insert(record.key.clone(), record.clone());
        Ok(())
    }

    async fn set_active_until(
        &self,
        key: &LicenseKey,
        active_until: DateTime<Utc>,
    ) -> Result<()> {
        let mut licenses = self.licenses.write().unwrap();
        if let Some(record) = licenses.get_mut(key) {
            record.active_until = active_until;
        }
        Ok(())
    }
}
