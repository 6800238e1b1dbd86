use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use crate::models::DailyHealthRecord;
use crate::score;

/// Daily log store. Opened once per process and handed to each command.
pub struct HealthLog {
    pool: SqlitePool,
}

impl HealthLog {
    pub async fn open(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url {database_url:?}"))?
            .create_if_missing(true);

        // Single interactive user, single writer.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open {database_url}"))?;

        let log = Self { pool };
        log.init_db().await?;
        tracing::debug!(database_url, "health log opened");
        Ok(log)
    }

    pub async fn init_db(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("failed to apply migrations")?;
        Ok(())
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Inserts the record, or overwrites every field of the row already stored for its date.
    pub async fn save(&self, record: &DailyHealthRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO health_log (date, steps, active_minutes, distance, score)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (date) DO UPDATE
            SET steps = EXCLUDED.steps,
                active_minutes = EXCLUDED.active_minutes,
                distance = EXCLUDED.distance,
                score = EXCLUDED.score
            "#,
        )
        .bind(record.date)
        .bind(record.steps)
        .bind(record.active_minutes)
        .bind(record.distance)
        .bind(record.score)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to save record for {}", record.date))?;

        tracing::info!(date = %record.date, score = record.score, "record saved");
        Ok(())
    }

    pub async fn load_all(&self) -> anyhow::Result<Vec<DailyHealthRecord>> {
        let rows = sqlx::query(
            "SELECT date, steps, active_minutes, distance, score FROM health_log ORDER BY date ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to load health log")?;

        rows.iter().map(record_from_row).collect()
    }

    pub async fn load_on(&self, date: NaiveDate) -> anyhow::Result<Option<DailyHealthRecord>> {
        let row = sqlx::query(
            "SELECT date, steps, active_minutes, distance, score FROM health_log WHERE date = ?1",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to load record for {date}"))?;

        row.as_ref().map(record_from_row).transpose()
    }

    /// Upserts every row of a `date,steps,active_minutes,distance` CSV.
    /// Scores are recomputed rather than trusted from the file.
    pub async fn import_csv(&self, csv_path: &Path) -> anyhow::Result<usize> {
        #[derive(serde::Deserialize)]
        struct CsvRow {
            date: NaiveDate,
            steps: u32,
            active_minutes: u32,
            distance: f64,
        }

        let mut reader = csv::Reader::from_path(csv_path)
            .with_context(|| format!("failed to open {}", csv_path.display()))?;
        let mut written = 0usize;

        for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
            let line = index + 2;
            let row = result.with_context(|| format!("invalid row on line {line}"))?;
            if !row.distance.is_finite() || row.distance < 0.0 {
                anyhow::bail!("line {line}: distance must be a non-negative number");
            }

            let record = DailyHealthRecord {
                date: row.date,
                steps: row.steps,
                active_minutes: row.active_minutes,
                distance: row.distance,
                score: score::calc_score(row.steps, row.active_minutes, row.distance),
            };
            self.save(&record).await?;
            written += 1;
        }

        Ok(written)
    }

    pub async fn export_csv(&self, csv_path: &Path) -> anyhow::Result<usize> {
        let records = self.load_all().await?;
        let mut writer = csv::Writer::from_path(csv_path)
            .with_context(|| format!("failed to create {}", csv_path.display()))?;
        for record in &records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(records.len())
    }
}

fn record_from_row(row: &SqliteRow) -> anyhow::Result<DailyHealthRecord> {
    Ok(DailyHealthRecord {
        date: row.try_get("date")?,
        steps: row.try_get("steps")?,
        active_minutes: row.try_get("active_minutes")?,
        distance: row.try_get("distance")?,
        score: row.try_get("score")?,
    })
}
