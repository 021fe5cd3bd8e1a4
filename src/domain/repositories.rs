//! Repository interfaces for offer persistence
//!
//! Contains the trait definition the scraping pipeline writes through.

use async_trait::async_trait;
use anyhow::Result;

use crate::domain::offer::JobOffer;

/// Deduplicating offer store keyed by `(url, title)`
///
/// Inserts are insert-or-ignore: an existing key is never replaced and is
/// not reported as new. Each record is inserted on its own, so a conflict on
/// one never rolls back the others.
#[async_trait]
pub trait OfferStore: Send + Sync {
    /// Insert every record whose key is not stored yet and return those, in input order
    ///
    /// A storage error other than a key conflict stops the batch and is
    /// returned. Records inserted before it stay committed but are not
    /// returned, so a later run treats them as already stored.
    async fn insert_new(&self, offers: &[JobOffer]) -> Result<Vec<JobOffer>>;

    /// Every stored record, in storage order
    async fn read_all(&self) -> Result<Vec<JobOffer>>;

    /// Remove all records and restart the storage order
    async fn reset(&self) -> Result<()>;

    /// Number of stored records
    async fn count(&self) -> Result<u64>;
}
