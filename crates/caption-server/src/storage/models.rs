//! Row models for the caption service tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use caption_licensing::{LicenseKey, LicenseRecord};

/// Row in `licenses`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LicenseRow {
    pub id: i64,
    pub email: String,
    pub license_key: String,
    pub active_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<LicenseRow> for LicenseRecord {
    fn from(row: LicenseRow) -> Self {
        Self {
            key: LicenseKey::new(row.license_key),
            email: row.email,
            active_until: row.active_until,
            created_at: row.created_at,
        }
    }
}

/// Row in `caption_records`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CaptionRow {
    pub id: i64,
    pub topic: String,
    pub tone: String,
    pub channel: String,
    pub caption: String,
    pub created_at: DateTime<Utc>,
}
