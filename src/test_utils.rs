//! Test utilities for the offer scraper
//!
//! Canned page fetchers and on-disk test databases so tests never touch the
//! network and each gets its own SQLite file.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tempfile::TempDir;
use url::Url;

use crate::domain::site::{SelectorMap, SiteDescriptor};
use crate::infrastructure::scrape_error::{ScrapeError, ScrapeResult};
use crate::infrastructure::{DatabaseConnection, PageFetcher, SqliteOfferRepository};

/// Page fetcher serving canned bodies and failures by URL
#[derive(Default)]
pub struct StaticPageFetcher {
    pages: HashMap<String, ScrapeResult<String>>,
    requested: Mutex<Vec<String>>,
}

impl StaticPageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.pages.insert(
            url.to_string(),
            Err(ScrapeError::HttpStatus { status, url: url.to_string() }),
        );
        self
    }

    /// URLs requested so far, in request order
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PageFetcher for StaticPageFetcher {
    async fn fetch(&self, url: &Url) -> ScrapeResult<String> {
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(url.to_string());
        }
        self.pages.get(url.as_str()).cloned().unwrap_or_else(|| {
            Err(ScrapeError::Transport {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
        })
    }
}

/// File-backed test database; in-memory pools would give every connection its own database
pub struct TestDatabase {
    _dir: TempDir,
    pub connection: DatabaseConnection,
}

impl TestDatabase {
    pub async fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let database_url = format!("sqlite:{}", dir.path().join("offers.db").display());
        let connection = DatabaseConnection::new(&database_url).await?;
        connection.migrate().await?;
        Ok(Self { _dir: dir, connection })
    }

    pub fn repository(&self) -> SqliteOfferRepository {
        SqliteOfferRepository::new(self.connection.pool().clone())
    }
}

/// Site with the `.job` / `.t` selectors used across tests
pub fn job_site(id: &str, url: &str) -> SiteDescriptor {
    SiteDescriptor {
        id: id.to_string(),
        url: Some(url.to_string()),
        selectors: Some(SelectorMap {
            offer_box: Some(".job".to_string()),
            title: Some(".t".to_string()),
            url: Some(".t".to_string()),
            company: Some(".c".to_string()),
            ..SelectorMap::default()
        }),
    }
}

/// Listing page with one `.job` box per `(title, href)` pair
pub fn job_page(jobs: &[(&str, &str)]) -> String {
    let boxes: String = jobs
        .iter()
        .map(|(title, href)| {
            format!(r#"<div class="job"><a class="t" href="{href}">{title}</a><span class="c">ACME</span></div>"#)
        })
        .collect();
    format!("<html><body>{boxes}</body></html>")
}
