//! End-to-end run: scrape every site, store new offers, report them
//!
//! Only store errors propagate; site failures are part of the returned
//! [`PipelineReport`] and delivery failures are per-recipient results.

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::notification::{DeliveryResult, ReportSink};
use super::orchestrator::ScrapeOrchestrator;
use super::report::{EmailFormatter, Report};
use crate::domain::offer::JobOffer;
use crate::domain::repositories::OfferStore;
use crate::domain::site::SiteDescriptor;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::simple_http_client::PageFetcher;

/// Pipeline settings taken from the scraper and notification sections
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub max_concurrent_sites: usize,
    pub recipients: Vec<String>,
    pub subject: Option<String>,
    pub notify_when_empty: bool,
}

impl PipelineOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_concurrent_sites: config.scraper.max_concurrent_sites,
            recipients: config.notification.recipients.clone(),
            subject: config.notification.subject.clone(),
            notify_when_empty: config.notification.notify_when_empty,
        }
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub sites: usize,
    pub failed_sites: Vec<String>,
    pub offers_scraped: usize,
    pub new_offers: Vec<JobOffer>,
    pub report: Report,
    /// None when nothing was delivered
    pub delivery: Option<DeliveryResult>,
}

pub struct ScrapePipeline<F> {
    orchestrator: ScrapeOrchestrator<F>,
    store: Arc<dyn OfferStore>,
    sink: Arc<dyn ReportSink>,
    formatter: EmailFormatter,
    options: PipelineOptions,
}

impl<F: PageFetcher> ScrapePipeline<F> {
    pub fn new(
        fetcher: F,
        store: Arc<dyn OfferStore>,
        sink: Arc<dyn ReportSink>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            orchestrator: ScrapeOrchestrator::new(fetcher),
            store,
            sink,
            formatter: EmailFormatter::new(),
            options,
        }
    }

    pub async fn run(&self, sites: &[SiteDescriptor]) -> Result<PipelineReport> {
        let run = self
            .orchestrator
            .run_concurrent(sites, self.options.max_concurrent_sites)
            .await;

        let failed_sites = run.failed_sites().map(|s| s.site_id.clone()).collect();
        let run_id = run.run_id;
        let site_count = run.sites.len();
        let scraped = run.into_offers();

        let new_offers = self.store.insert_new(&scraped).await?;
        info!(
            "Run {}: {} offers scraped, {} new",
            run_id,
            scraped.len(),
            new_offers.len()
        );

        let mut report = self.formatter.format_now(&new_offers);
        if let Some(subject) = &self.options.subject {
            report.subject.clone_from(subject);
        }

        let delivery = if self.should_deliver(&new_offers) {
            Some(self.sink.deliver(&report, &self.options.recipients).await)
        } else {
            info!("No report delivered");
            None
        };

        Ok(PipelineReport {
            run_id,
            sites: site_count,
            failed_sites,
            offers_scraped: scraped.len(),
            new_offers,
            report,
            delivery,
        })
    }

    fn should_deliver(&self, new_offers: &[JobOffer]) -> bool {
        !self.options.recipients.is_empty()
            && (!new_offers.is_empty() || self.options.notify_when_empty)
    }
}
