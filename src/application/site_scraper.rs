//! Scraping of a single configured site
//!
//! A site descriptor goes in, a [`SiteOutcome`] comes out. Configuration
//! defects are detected before any request is made; transport failures are
//! absorbed. Neither ever reaches the caller as an error.

use tracing::{error, info};
use url::Url;

use crate::domain::extraction::Extraction;
use crate::domain::offer::JobOffer;
use crate::domain::site::{RequiredSelectors, SiteDescriptor};
use crate::infrastructure::parsing::selector_resolver::origin_base;
use crate::infrastructure::parsing::{OfferListParser, ParseContext};
use crate::infrastructure::scrape_error::{ScrapeError, ScrapeResult};
use crate::infrastructure::simple_http_client::PageFetcher;

/// What happened to one site during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteOutcome {
    /// The page was fetched and parsed; the extraction may be empty
    Scraped(Extraction),
    /// Missing URL, selectors, or an unusable URL; no request was made
    ConfigurationDefect(String),
    /// Request failed, timed out, or returned a non-success status
    TransportFailure(String),
}

impl SiteOutcome {
    /// Offers of a successful scrape, empty for failures
    pub fn offers(&self) -> &[JobOffer] {
        match self {
            Self::Scraped(extraction) => &extraction.offers,
            Self::ConfigurationDefect(_) | Self::TransportFailure(_) => &[],
        }
    }

    pub fn into_offers(self) -> Vec<JobOffer> {
        match self {
            Self::Scraped(extraction) => extraction.offers,
            Self::ConfigurationDefect(_) | Self::TransportFailure(_) => Vec::new(),
        }
    }

    pub const fn is_failure(&self) -> bool {
        !matches!(self, Self::Scraped(_))
    }
}

impl From<ScrapeError> for SiteOutcome {
    fn from(error: ScrapeError) -> Self {
        if error.is_configuration_defect() {
            Self::ConfigurationDefect(error.to_string())
        } else {
            Self::TransportFailure(error.to_string())
        }
    }
}

/// Outcome of one site, tagged with its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteReport {
    pub site_id: String,
    pub outcome: SiteOutcome,
}

/// A site that passed configuration checks
struct ValidatedSite<'a> {
    url: Url,
    base_url: Url,
    selectors: RequiredSelectors<'a>,
}

/// Scrapes one site through a [`PageFetcher`]
pub struct SiteScraper<F> {
    fetcher: F,
}

impl<F: PageFetcher> SiteScraper<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Scrape one site; failures become non-`Scraped` outcomes and are logged
    pub async fn scrape(&self, site: &SiteDescriptor) -> SiteOutcome {
        match self.try_scrape(site).await {
            Ok(extraction) => {
                info!(
                    "Scraped {} offers from '{}' ({} offer boxes, {} skipped)",
                    extraction.offers.len(),
                    site.id,
                    extraction.fragments_matched,
                    extraction.skipped.len()
                );
                SiteOutcome::Scraped(extraction)
            }
            Err(e) => {
                error!("Scraping '{}' failed: {}", site.id, e);
                e.into()
            }
        }
    }

    /// Offers of one site; empty on any failure
    pub async fn scrape_offers(&self, site: &SiteDescriptor) -> Vec<JobOffer> {
        self.scrape(site).await.into_offers()
    }

    async fn try_scrape(&self, site: &SiteDescriptor) -> ScrapeResult<Extraction> {
        let validated = validate(site)?;
        let body = self.fetcher.fetch(&validated.url).await?;

        // the parsed document is not Send; parse only after the last await
        let parser = OfferListParser::new(&validated.selectors);
        let context = ParseContext::new(site.id.as_str(), validated.base_url);
        Ok(parser.parse_str(&body, &context))
    }
}

fn validate(site: &SiteDescriptor) -> ScrapeResult<ValidatedSite<'_>> {
    let raw_url = site.target_url().ok_or_else(|| ScrapeError::MissingUrl {
        site_id: site.id.clone(),
    })?;

    let selectors = site
        .selectors
        .as_ref()
        .ok_or_else(|| ScrapeError::MissingSelectors {
            site_id: site.id.clone(),
        })?
        .required()
        .map_err(|source| ScrapeError::MissingSelector {
            site_id: site.id.clone(),
            source,
        })?;

    let invalid_url = |reason: String| ScrapeError::InvalidUrl {
        site_id: site.id.clone(),
        url: raw_url.to_string(),
        reason,
    };
    let url = Url::parse(raw_url).map_err(|e| invalid_url(e.to_string()))?;
    let base_url = origin_base(&url).ok_or_else(|| invalid_url("URL has no host".to_string()))?;

    Ok(ValidatedSite {
        url,
        base_url,
        selectors,
    })
}
