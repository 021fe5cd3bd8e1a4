//! Error types for scraping a single site
//!
//! Every variant is absorbed by the site scraper and turned into an empty
//! result for that site. The split between configuration defects and
//! transport failures only decides how the outcome is reported.

use thiserror::Error;

use crate::domain::site::MissingSelector;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("Site '{site_id}' has no URL configured")]
    MissingUrl { site_id: String },

    #[error("Site '{site_id}' has no selectors configured")]
    MissingSelectors { site_id: String },

    #[error("Site '{site_id}': {source}")]
    MissingSelector {
        site_id: String,
        #[source]
        source: MissingSelector,
    },

    #[error("Site '{site_id}' has an invalid URL '{url}': {reason}")]
    InvalidUrl {
        site_id: String,
        url: String,
        reason: String,
    },

    #[error("HTTP error {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("HTTP request failed for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Failed to read response body from {url}: {message}")]
    BodyRead { url: String, message: String },
}

impl ScrapeError {
    /// True for problems in the site configuration rather than the network
    pub const fn is_configuration_defect(&self) -> bool {
        matches!(
            self,
            Self::MissingUrl { .. }
                | Self::MissingSelectors { .. }
                | Self::MissingSelector { .. }
                | Self::InvalidUrl { .. }
        )
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
