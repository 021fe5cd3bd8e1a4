//! End-to-end pipeline tests: YAML config -> scrape -> store -> report
//!
//! Pages come from a canned fetcher; the store is a SQLite file in a temp dir.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use url::Url;

use offer_scraper_lib::application::{
    FileReportSink, LogReportSink, PipelineOptions, ScrapeOrchestrator, ScrapePipeline, SiteOutcome,
};
use offer_scraper_lib::domain::OfferStore;
use offer_scraper_lib::infrastructure::{
    ConfigLoader, DatabaseConnection, PageFetcher, ScrapeError, ScrapeResult, SqliteOfferRepository,
};

const CONFIG: &str = r#"
scraper:
  max_concurrent_sites: 3
  sites:
    - id: olx
      url: https://www.olx.pl/praca/krakow/
      selectors:
        offerBox: "div[data-cy='l-card']"
        title: h6
        url: a
        salary: ".price"
        addInfo: ".tags"
    - id: broken
      url: https://broken.example/jobs
      selectors:
        offerBox: ".job"
        title: ".t"
        url: ".t"
    - id: incomplete
      url: https://incomplete.example/jobs
      selectors:
        offerBox: ".job"
        title: ".t"
    - id: pracuj
      url: https://www.pracuj.pl/praca/krakow
      selectors:
        offerBox: ".offer"
        title: "h2"
        url: "h2 a"
        company: ".company"
notification:
  recipients: ["ops@example.com"]
"#;

const OLX_PAGE: &str = r#"
<html><body>
  <div data-cy="l-card">
    <a href="/d/oferta/kelner-ID1.html"><h6>Kelner / Kelnerka</h6></a>
    <p class="price">30 - 35 zł / godz.</p>
    <div class="tags"><ul><li>Pełny etat</li><li>Umowa zlecenie</li></ul></div>
  </div>
  <div data-cy="l-card">
    <a href="https://www.olx.pl/d/oferta/barista-ID2.html"><h6>Barista</h6></a>
  </div>
  <div data-cy="l-card"><h6>Bez linku</h6></div>
</body></html>
"#;

const PRACUJ_PAGE: &str = r#"
<html><body>
  <div class="offer"><h2><a href="https://www.pracuj.pl/praca/recepcjonista,oferta,1">Recepcjonista</a></h2><span class="company">Hotel</span></div>
</body></html>
"#;

struct CannedFetcher {
    pages: HashMap<&'static str, &'static str>,
}

impl CannedFetcher {
    fn new() -> Self {
        Self {
            pages: HashMap::from([
                ("https://www.olx.pl/praca/krakow/", OLX_PAGE),
                ("https://www.pracuj.pl/praca/krakow", PRACUJ_PAGE),
            ]),
        }
    }
}

#[async_trait]
impl PageFetcher for CannedFetcher {
    async fn fetch(&self, url: &Url) -> ScrapeResult<String> {
        self.pages
            .get(url.as_str())
            .map(|page| (*page).to_string())
            .ok_or_else(|| ScrapeError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}

async fn store(dir: &TempDir) -> Result<Arc<dyn OfferStore>> {
    let url = format!("sqlite:{}", dir.path().join("offers.db").display());
    let db = DatabaseConnection::new(&url).await?;
    db.migrate().await?;
    Ok(Arc::new(SqliteOfferRepository::new(db.pool().clone())))
}

#[tokio::test]
async fn configured_sites_flow_into_the_store() -> Result<()> {
    let loader = ConfigLoader::from_yaml_str(CONFIG)?;
    let dir = tempfile::tempdir()?;
    let store = store(&dir).await?;

    let pipeline = ScrapePipeline::new(
        CannedFetcher::new(),
        Arc::clone(&store),
        Arc::new(LogReportSink),
        PipelineOptions::from_config(loader.config()),
    );
    let report = pipeline.run(loader.get_sites_config()).await?;

    assert_eq!(report.sites, 4);
    assert_eq!(report.failed_sites, ["broken", "incomplete"]);
    assert_eq!(report.offers_scraped, 3);

    let stored = store.read_all().await?;
    let urls: Vec<_> = stored.iter().map(|o| o.url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "https://www.olx.pl/d/oferta/kelner-ID1.html",
            "https://www.olx.pl/d/oferta/barista-ID2.html",
            "https://www.pracuj.pl/praca/recepcjonista,oferta,1",
        ]
    );
    assert_eq!(stored[0].add_info.as_deref(), Some("Pełny etat, Umowa zlecenie"));
    assert_eq!(stored[0].salary.as_deref(), Some("30 - 35 zł / godz."));
    assert_eq!(stored[2].company.as_deref(), Some("Hotel"));
    assert_eq!(stored[2].site_id, "pracuj");

    assert!(report.report.subject.starts_with("Job Scraper Report - 3 offers from 2 sites"));
    assert!(report.report.body.contains("Position: Kelner / Kelnerka"));
    Ok(())
}

#[tokio::test]
async fn rerun_over_unchanged_pages_adds_nothing() -> Result<()> {
    let loader = ConfigLoader::from_yaml_str(CONFIG)?;
    let dir = tempfile::tempdir()?;
    let store = store(&dir).await?;
    let reports = dir.path().join("reports");

    let pipeline = ScrapePipeline::new(
        CannedFetcher::new(),
        Arc::clone(&store),
        Arc::new(FileReportSink::new(&reports)),
        PipelineOptions::from_config(loader.config()),
    );

    let first = pipeline.run(loader.get_sites_config()).await?;
    let second = pipeline.run(loader.get_sites_config()).await?;

    assert_eq!(first.new_offers.len(), 3);
    assert!(second.new_offers.is_empty());
    assert!(second.delivery.is_none());
    assert_eq!(store.count().await?, 3);
    assert_eq!(std::fs::read_dir(&reports)?.count(), 1);
    Ok(())
}

#[tokio::test]
async fn reset_makes_offers_new_again() -> Result<()> {
    let loader = ConfigLoader::from_yaml_str(CONFIG)?;
    let dir = tempfile::tempdir()?;
    let store = store(&dir).await?;
    let pipeline = ScrapePipeline::new(
        CannedFetcher::new(),
        Arc::clone(&store),
        Arc::new(LogReportSink),
        PipelineOptions::default(),
    );

    pipeline.run(loader.get_sites_config()).await?;
    store.reset().await?;
    let after_reset = pipeline.run(loader.get_sites_config()).await?;

    assert_eq!(after_reset.new_offers.len(), 3);
    Ok(())
}

#[tokio::test]
async fn outcomes_distinguish_defects_from_transport_failures() -> Result<()> {
    let loader = ConfigLoader::from_yaml_str(CONFIG)?;
    let orchestrator = ScrapeOrchestrator::new(CannedFetcher::new());

    let run = orchestrator.run(loader.get_sites_config()).await;

    assert!(matches!(run.sites[0].outcome, SiteOutcome::Scraped(_)));
    assert!(matches!(run.sites[1].outcome, SiteOutcome::TransportFailure(_)));
    assert!(matches!(run.sites[2].outcome, SiteOutcome::ConfigurationDefect(_)));
    match &run.sites[0].outcome {
        SiteOutcome::Scraped(extraction) => {
            assert_eq!(extraction.fragments_matched, 3);
            assert_eq!(extraction.skipped.len(), 1);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    Ok(())
}
