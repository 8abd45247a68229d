//! Database queries for licenses and the caption log.

use chrono::{DateTime, Utc};

use super::db::{Database, DatabaseError};
use super::models::{CaptionRow, LicenseRow};

impl Database {
    // =========================================================================
    // License queries
    // =========================================================================

    /// Look up a license by its key.
    pub async fn get_license(
        &self,
        license_key: &str,
    ) -> Result<Option<LicenseRow>, DatabaseError> {
        let row = sqlx::query_as::<_, LicenseRow>("SELECT * FROM licenses WHERE license_key = ?")
            .bind(license_key)
            .fetch_optional(self.pool())
            .await?;

        Ok(row)
    }

    /// Insert a new license. Fails on a duplicate key: `license_key`
    /// is unique and renewal goes through the update path.
    pub async fn insert_license(
        &self,
        email: &str,
        license_key: &str,
        active_until: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO licenses (email, license_key, active_until, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(email)
        .bind(license_key)
        .bind(active_until)
        .bind(created_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Overwrite `active_until` for an existing license.
    pub async fn update_license_active_until(
        &self,
        license_key: &str,
        active_until: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE licenses SET active_until = ? WHERE license_key = ?")
            .bind(active_until)
            .bind(license_key)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Caption log
    // =========================================================================

    /// Append a generated caption to the log.
    pub async fn insert_caption(
        &self,
        topic: &str,
        tone: &str,
        channel: &str,
        caption: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO caption_records (topic, tone, channel, caption, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(topic)
        .bind(tone)
        .bind(channel)
        .bind(caption)
        .bind(created_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Most recent captions, newest first.
    pub async fn recent_captions(&self, limit: i64) -> Result<Vec<CaptionRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, CaptionRow>(
            "SELECT * FROM caption_records ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    /// Number of captions in the log.
    pub async fn count_captions(&self) -> Result<i64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM caption_records")
            .fetch_one(self.pool())
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn test_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn instant(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_license_roundtrip() {
        let db = test_db().await;
        db.insert_license("buyer@example.com", "KEY-1", instant(19, 0), instant(1, 12))
            .await
            .unwrap();

        let row = db.get_license("KEY-1").await.unwrap().unwrap();
        assert_eq!(row.email, "buyer@example.com");
        assert_eq!(row.active_until, instant(19, 0));
        assert_eq!(row.created_at, instant(1, 12));

        assert!(db.get_license("KEY-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_license_key_is_unique() {
        let db = test_db().await;
        db.insert_license("a@example.com", "KEY-1", instant(19, 0), instant(1, 12))
            .await
            .unwrap();

        let duplicate = db
            .insert_license("b@example.com", "KEY-1", instant(20, 0), instant(2, 12))
            .await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_update_active_until() {
        let db = test_db().await;
        db.insert_license("buyer@example.com", "KEY-1", instant(19, 0), instant(1, 12))
            .await
            .unwrap();

        let updated = db
            .update_license_active_until("KEY-1", instant(25, 0))
            .await
            .unwrap();
        assert!(updated);

        let row = db.get_license("KEY-1").await.unwrap().unwrap();
        assert_eq!(row.active_until, instant(25, 0));
        assert_eq!(row.created_at, instant(1, 12));

        let missing = db
            .update_license_active_until("KEY-2", instant(25, 0))
            .await
            .unwrap();
        assert!(!missing);
    }

    #[tokio::test]
    async fn test_caption_log_appends() {
        let db = test_db().await;
        assert_eq!(db.count_captions().await.unwrap(), 0);

        db.insert_caption("rust", "witty", "twitter", "Ship it! #rust", instant(1, 12))
            .await
            .unwrap();
        db.insert_caption("cats", "warm", "instagram", "Purr. #cats", instant(1, 13))
            .await
            .unwrap();

        assert_eq!(db.count_captions().await.unwrap(), 2);
        let recent = db.recent_captions(1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].caption, "Purr. #cats");
    }
}
