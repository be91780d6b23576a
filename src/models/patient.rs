//! Patient history model
//!
//! Append-only log of past single predictions. Records are created once,
//! right after a successful prediction, and never updated or deleted here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Patient {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub prediction: String,
    /// Stored as a 0-100 percentage, two decimals
    pub confidence: f64,
    pub mean_radius: f64,
    pub mean_area: f64,
}

/// History entry as served by the read interface.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub date: String,
    pub prediction: String,
    pub confidence: f64,
    pub radius: f64,
    pub area: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Patient {
    /// Append one history record. `confidence` is the 0-1 display confidence;
    /// it is stored as a rounded percentage.
    pub async fn insert(
        pool: &SqlitePool,
        prediction: &str,
        confidence: f64,
        mean_radius: f64,
        mean_area: f64,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO patients (timestamp, prediction, confidence, mean_radius, mean_area)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(Utc::now())
        .bind(prediction)
        .bind(round2(confidence * 100.0))
        .bind(mean_radius)
        .bind(mean_area)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Most recent records, newest first.
    pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Patient>(
            "SELECT * FROM patients ORDER BY timestamp DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub fn into_history_entry(self) -> HistoryEntry {
        HistoryEntry {
            id: self.id,
            date: self.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            prediction: self.prediction,
            confidence: self.confidence,
            radius: round2(self.mean_radius),
            area: round2(self.mean_area),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    // File-backed scratch database: a pooled `sqlite::memory:` would give
    // every connection its own empty database.
    async fn scratch_pool() -> (SqlitePool, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("history.db").display());
        let pool = db::create_pool(&url).await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        (pool, dir)
    }

    #[tokio::test]
    async fn test_insert_and_recent_ordering() {
        let (pool, _dir) = scratch_pool().await;

        for i in 0..12 {
            Patient::insert(&pool, "Benign", 0.9, 14.0 + i as f64, 500.0)
                .await
                .unwrap();
        }

        let records = Patient::recent(&pool, 10).await.unwrap();
        assert_eq!(records.len(), 10);
        // Newest first
        assert!(records.first().unwrap().id > records.last().unwrap().id);
        assert_eq!(records[0].mean_radius, 25.0);
    }

    #[tokio::test]
    async fn test_confidence_stored_as_percentage() {
        let (pool, _dir) = scratch_pool().await;

        let id = Patient::insert(&pool, "Malignant", 0.9236, 17.99, 1203.456)
            .await
            .unwrap();
        assert_eq!(id, 1);

        let records = Patient::recent(&pool, 10).await.unwrap();
        assert_eq!(records[0].prediction, "Malignant");
        assert_eq!(records[0].confidence, 92.36);

        let entry = records.into_iter().next().unwrap().into_history_entry();
        assert_eq!(entry.radius, 17.99);
        assert_eq!(entry.area, 1203.46);
        assert_eq!(entry.date.len(), 16);
    }
}
