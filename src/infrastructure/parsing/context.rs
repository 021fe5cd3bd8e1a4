//! Parsing context for listing-page extraction

use url::Url;

/// Context information for one listing page
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Site the offers are attributed to
    pub site_id: String,

    /// Scheme + host of the listing page, for resolving relative links
    pub base_url: Url,
}

impl ParseContext {
    /// Create new parse context
    pub fn new(site_id: impl Into<String>, base_url: Url) -> Self {
        Self {
            site_id: site_id.into(),
            base_url,
        }
    }
}
