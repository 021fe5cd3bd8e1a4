//! Site descriptors and their selector maps
//!
//! A descriptor names one listing page and the CSS selectors used to pull
//! offers out of it. The selector map has a fixed shape; keys the scraper
//! does not know are dropped during deserialization.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One configured site to scrape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDescriptor {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub selectors: Option<SelectorMap>,
}

/// CSS selectors recognized for a site
///
/// The layered config loader folds keys to lower case, so each camelCase key
/// also accepts its folded and snake_case spellings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorMap {
    #[serde(default, rename = "offerBox", alias = "offerbox", alias = "offer_box")]
    pub offer_box: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default, rename = "addInfo", alias = "addinfo", alias = "add_info")]
    pub add_info: Option<String>,
}

/// Mandatory selector keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKey {
    OfferBox,
    Title,
    Url,
}

impl SelectorKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OfferBox => "offerBox",
            Self::Title => "title",
            Self::Url => "url",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("mandatory selector '{}' is missing", .0.as_str())]
pub struct MissingSelector(pub SelectorKey);

/// Validated view over a selector map with the mandatory keys present
#[derive(Debug, Clone, Copy)]
pub struct RequiredSelectors<'a> {
    pub offer_box: &'a str,
    pub title: &'a str,
    pub url: &'a str,
    pub company: Option<&'a str>,
    pub location: Option<&'a str>,
    pub salary: Option<&'a str>,
    pub add_info: Option<&'a str>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl SelectorMap {
    /// Check the mandatory keys and borrow every configured selector
    pub fn required(&self) -> Result<RequiredSelectors<'_>, MissingSelector> {
        let offer_box =
            present(self.offer_box.as_ref()).ok_or(MissingSelector(SelectorKey::OfferBox))?;
        let title = present(self.title.as_ref()).ok_or(MissingSelector(SelectorKey::Title))?;
        let url = present(self.url.as_ref()).ok_or(MissingSelector(SelectorKey::Url))?;

        Ok(RequiredSelectors {
            offer_box,
            title,
            url,
            company: present(self.company.as_ref()),
            location: present(self.location.as_ref()),
            salary: present(self.salary.as_ref()),
            add_info: present(self.add_info.as_ref()),
        })
    }
}

impl SiteDescriptor {
    /// Listing URL, if configured and not blank
    pub fn target_url(&self) -> Option<&str> {
        present(self.url.as_ref())
    }
}
