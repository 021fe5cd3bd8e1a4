//! Runs the site scraper over every configured site
//!
//! Sites are independent: one failing site never affects the others, and
//! the combined offer list always follows descriptor order, then document
//! order within each page.

use futures::stream::{self, StreamExt};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use super::site_scraper::{SiteReport, SiteScraper};
use crate::domain::offer::JobOffer;
use crate::domain::site::SiteDescriptor;
use crate::infrastructure::simple_http_client::PageFetcher;

/// Per-site outcomes of one run, in descriptor order
#[derive(Debug, Clone)]
pub struct ScrapeRun {
    pub run_id: Uuid,
    pub sites: Vec<SiteReport>,
}

impl ScrapeRun {
    /// All offers, concatenated in descriptor order
    pub fn offers(&self) -> impl Iterator<Item = &JobOffer> + '_ {
        self.sites.iter().flat_map(|site| site.outcome.offers())
    }

    pub fn into_offers(self) -> Vec<JobOffer> {
        self.sites
            .into_iter()
            .flat_map(|site| site.outcome.into_offers())
            .collect()
    }

    pub fn offer_count(&self) -> usize {
        self.sites.iter().map(|site| site.outcome.offers().len()).sum()
    }

    /// Sites that ended in a configuration defect or transport failure
    pub fn failed_sites(&self) -> impl Iterator<Item = &SiteReport> + '_ {
        self.sites.iter().filter(|site| site.outcome.is_failure())
    }
}

pub struct ScrapeOrchestrator<F> {
    scraper: SiteScraper<F>,
}

impl<F: PageFetcher> ScrapeOrchestrator<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            scraper: SiteScraper::new(fetcher),
        }
    }

    pub fn scraper(&self) -> &SiteScraper<F> {
        &self.scraper
    }

    /// Scrape every site sequentially and concatenate the offers
    pub async fn scrape_all(&self, sites: &[SiteDescriptor]) -> Vec<JobOffer> {
        self.run(sites).await.into_offers()
    }

    /// Scrape every site sequentially, keeping per-site outcomes
    pub async fn run(&self, sites: &[SiteDescriptor]) -> ScrapeRun {
        let run_id = Uuid::new_v4();
        let span = info_span!("scrape_run", run_id = %run_id, sites = sites.len());

        async {
            let mut reports = Vec::with_capacity(sites.len());
            for site in sites {
                reports.push(self.scrape_site(site).await);
            }
            finish(run_id, reports)
        }
        .instrument(span)
        .await
    }

    /// Scrape with at most `limit` sites in flight; output stays in descriptor order
    pub async fn run_concurrent(&self, sites: &[SiteDescriptor], limit: usize) -> ScrapeRun {
        if limit <= 1 {
            return self.run(sites).await;
        }

        let run_id = Uuid::new_v4();
        let span = info_span!("scrape_run", run_id = %run_id, sites = sites.len(), limit);

        async {
            let reports = stream::iter(sites)
                .map(|site| self.scrape_site(site))
                .buffered(limit)
                .collect::<Vec<_>>()
                .await;
            finish(run_id, reports)
        }
        .instrument(span)
        .await
    }

    async fn scrape_site(&self, site: &SiteDescriptor) -> SiteReport {
        let outcome = self
            .scraper
            .scrape(site)
            .instrument(info_span!("site", site_id = %site.id))
            .await;

        SiteReport {
            site_id: site.id.clone(),
            outcome,
        }
    }
}

fn finish(run_id: Uuid, sites: Vec<SiteReport>) -> ScrapeRun {
    let run = ScrapeRun { run_id, sites };
    info!(
        "Scrape run finished: {} offers from {} sites ({} failed)",
        run.offer_count(),
        run.sites.len(),
        run.failed_sites().count()
    );
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::site_scraper::SiteOutcome;
    use crate::test_utils::{StaticPageFetcher, job_page, job_site};

    const A: &str = "https://a.example/jobs";
    const B: &str = "https://b.example/jobs";
    const C: &str = "https://c.example/jobs";

    fn fetcher() -> StaticPageFetcher {
        StaticPageFetcher::new()
            .with_page(A, &job_page(&[("A1", "/1"), ("A2", "/2")]))
            .with_page(C, &job_page(&[("C1", "/1")]))
        // B is unreachable
    }

    fn sites() -> Vec<SiteDescriptor> {
        vec![job_site("a", A), job_site("b", B), job_site("c", C)]
    }

    fn titles(offers: &[JobOffer]) -> Vec<&str> {
        offers.iter().map(|o| o.title.as_str()).collect()
    }

    #[tokio::test]
    async fn failing_site_does_not_affect_others() {
        let orchestrator = ScrapeOrchestrator::new(fetcher());

        let offers = orchestrator.scrape_all(&sites()).await;

        assert_eq!(titles(&offers), ["A1", "A2", "C1"]);
    }

    #[tokio::test]
    async fn run_keeps_per_site_outcomes() {
        let orchestrator = ScrapeOrchestrator::new(fetcher());

        let run = orchestrator.run(&sites()).await;

        let ids: Vec<_> = run.sites.iter().map(|s| s.site_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert!(matches!(run.sites[1].outcome, SiteOutcome::TransportFailure(_)));
        assert_eq!(run.failed_sites().count(), 1);
        assert_eq!(run.offer_count(), 3);
        assert_eq!(run.offers().count(), 3);
    }

    #[tokio::test]
    async fn empty_site_list() {
        let orchestrator = ScrapeOrchestrator::new(StaticPageFetcher::new());
        assert!(orchestrator.scrape_all(&[]).await.is_empty());
        assert!(orchestrator.run_concurrent(&[], 4).await.sites.is_empty());
    }

    #[tokio::test]
    async fn sites_are_requested_in_order() {
        let orchestrator = ScrapeOrchestrator::new(fetcher());
        orchestrator.run(&sites()).await;
        assert_eq!(orchestrator.scraper().fetcher().requested(), [A, B, C]);
    }

    #[tokio::test]
    async fn concurrent_run_matches_sequential_order() {
        let orchestrator = ScrapeOrchestrator::new(fetcher());

        let sequential = orchestrator.run(&sites()).await;
        let concurrent = orchestrator.run_concurrent(&sites(), 3).await;

        assert_ne!(sequential.run_id, concurrent.run_id);
        assert_eq!(sequential.sites, concurrent.sites);
        assert_eq!(titles(&concurrent.into_offers()), ["A1", "A2", "C1"]);
    }

    #[tokio::test]
    async fn duplicates_across_sites_are_kept() {
        let page = job_page(&[("Kelner", "https://shared.example/1")]);
        let orchestrator = ScrapeOrchestrator::new(
            StaticPageFetcher::new().with_page(A, &page).with_page(B, &page),
        );

        let offers = orchestrator.scrape_all(&[job_site("a", A), job_site("b", B)]).await;
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].key(), offers[1].key());
    }
}
