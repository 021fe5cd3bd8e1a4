//! SQLite implementation of the offer store
//!
//! Every record is inserted with its own `INSERT ... ON CONFLICT DO NOTHING`,
//! so a duplicate never aborts the rest of a batch and concurrent writers
//! racing on the same key see exactly one winner.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::{debug, error, info};

use crate::domain::offer::JobOffer;
use crate::domain::repositories::OfferStore;

pub struct SqliteOfferRepository {
    pool: SqlitePool,
}

impl SqliteOfferRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Helper method to convert database row to JobOffer
    fn row_to_offer(row: &sqlx::sqlite::SqliteRow) -> Result<JobOffer> {
        Ok(JobOffer {
            title: row.try_get("title")?,
            url: row.try_get("url")?,
            company: row.try_get("company")?,
            location: row.try_get("location")?,
            salary: row.try_get("salary")?,
            add_info: row.try_get("add_info")?,
            site_id: row.try_get("site_id")?,
        })
    }

    /// Insert one record; true when the key was not stored before
    async fn insert_one(&self, offer: &JobOffer) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO job_offers (url, title, company, location, salary, site_id, add_info)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(url, title) DO NOTHING
            "#,
        )
        .bind(&offer.url)
        .bind(&offer.title)
        .bind(&offer.company)
        .bind(&offer.location)
        .bind(&offer.salary)
        .bind(&offer.site_id)
        .bind(&offer.add_info)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl OfferStore for SqliteOfferRepository {
    async fn insert_new(&self, offers: &[JobOffer]) -> Result<Vec<JobOffer>> {
        let mut inserted = Vec::new();
        for offer in offers {
            match self.insert_one(offer).await {
                Ok(true) => inserted.push(offer.clone()),
                Ok(false) => debug!("Offer already stored: '{}' ({})", offer.title, offer.url),
                Err(e) => {
                    error!(
                        "Insert of '{}' ({}) failed after {} new offers were committed: {}",
                        offer.title,
                        offer.url,
                        inserted.len(),
                        e
                    );
                    for committed in &inserted {
                        error!("Committed but unreported: '{}' ({})", committed.title, committed.url);
                    }
                    return Err(e);
                }
            }
        }

        info!("Stored {} new of {} offers", inserted.len(), offers.len());
        Ok(inserted)
    }

    async fn read_all(&self) -> Result<Vec<JobOffer>> {
        let rows = sqlx::query(
            "SELECT url, title, company, location, salary, site_id, add_info FROM job_offers ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_offer).collect()
    }

    async fn reset(&self) -> Result<()> {
        let result = sqlx::query("DELETE FROM job_offers").execute(&self.pool).await?;
        info!("Removed {} stored offers", result.rows_affected());
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM job_offers")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count)?)
    }
}
