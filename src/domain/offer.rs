//! Job offer entity extracted from listing pages
//!
//! An offer is built once by the extractor and never mutated afterwards.
//! Its persistence identity is the `(url, title)` pair.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single job offer scraped from a site's listing page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobOffer {
    pub title: String,
    pub url: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    #[serde(rename = "addInfo")]
    pub add_info: Option<String>,
    #[serde(rename = "siteId")]
    pub site_id: String,
}

/// Natural identity of an offer in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OfferKey {
    pub url: String,
    pub title: String,
}

impl JobOffer {
    /// Create an offer with only the mandatory fields set
    pub fn new(title: impl Into<String>, url: impl Into<String>, site_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            company: None,
            location: None,
            salary: None,
            add_info: None,
            site_id: site_id.into(),
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_salary(mut self, salary: impl Into<String>) -> Self {
        self.salary = Some(salary.into());
        self
    }

    pub fn with_add_info(mut self, add_info: impl Into<String>) -> Self {
        self.add_info = Some(add_info.into());
        self
    }

    /// The `(url, title)` key used for deduplication
    pub fn key(&self) -> OfferKey {
        OfferKey {
            url: self.url.clone(),
            title: self.title.clone(),
        }
    }
}

impl fmt::Display for JobOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Site: {}", self.site_id)?;
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Company: {}", self.company.as_deref().unwrap_or("None"))?;
        writeln!(f, "Location: {}", self.location.as_deref().unwrap_or("None"))?;
        writeln!(f, "Salary: {}", self.salary.as_deref().unwrap_or("None"))?;
        writeln!(f, "URL: {}", self.url)?;
        writeln!(f, "Additional Info: {}", self.add_info.as_deref().unwrap_or("N/A"))?;
        write!(f, "{}", "-".repeat(20))
    }
}
