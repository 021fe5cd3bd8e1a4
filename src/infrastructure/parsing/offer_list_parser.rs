//! Offer list parser for configured listing pages
//!
//! Enumerates the offer boxes of a page and builds one offer per box that has
//! both a title and a link. Every other box becomes an explicit skip outcome;
//! a page with no boxes is an empty extraction, never an error.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::selector_resolver::{
    compile_lenient, select_attribute, select_list_text, select_text,
};
use super::{ContextualParser, ParseContext};
use crate::domain::extraction::{Extraction, FragmentOutcome, SkipReason};
use crate::domain::offer::JobOffer;
use crate::domain::site::RequiredSelectors;

/// Attribute read by the `url` selector
const LINK_ATTRIBUTE: &str = "href";

/// Parser for extracting offers from one site's listing page
pub struct OfferListParser {
    offer_box: Option<Selector>,
    offer_box_source: String,
    title: Option<Selector>,
    url: Option<Selector>,
    company: Option<Selector>,
    location: Option<Selector>,
    salary: Option<Selector>,
    add_info: Option<Selector>,
}

impl OfferListParser {
    /// Compile the site's selectors; invalid ones behave as "matches nothing"
    pub fn new(selectors: &RequiredSelectors<'_>) -> Self {
        Self {
            offer_box: compile_lenient(selectors.offer_box),
            offer_box_source: selectors.offer_box.to_string(),
            title: compile_lenient(selectors.title),
            url: compile_lenient(selectors.url),
            company: selectors.company.and_then(compile_lenient),
            location: selectors.location.and_then(compile_lenient),
            salary: selectors.salary.and_then(compile_lenient),
            add_info: selectors.add_info.and_then(compile_lenient),
        }
    }

    /// Parse a raw HTML body
    pub fn parse_str(&self, html: &str, context: &ParseContext) -> Extraction {
        let document = Html::parse_document(html);
        self.parse_with_context(&document, context)
    }

    /// Build the outcome for one offer box
    pub fn extract_fragment(
        &self,
        fragment: ElementRef<'_>,
        index: usize,
        context: &ParseContext,
    ) -> FragmentOutcome {
        let text_of = |selector: &Option<Selector>| {
            selector.as_ref().and_then(|s| select_text(fragment, s))
        };

        let title = text_of(&self.title);
        let url = self
            .url
            .as_ref()
            .and_then(|s| select_attribute(fragment, s, LINK_ATTRIBUTE, Some(&context.base_url)));

        let (title, url) = match (title, url) {
            (Some(title), Some(url)) => (title, url),
            (title, url) => {
                let reason = SkipReason::from_presence(title.is_some(), url.is_some())
                    .unwrap_or(SkipReason::MissingTitleAndUrl);
                debug!(
                    "Skipping offer box {} on '{}': {:?} (title: {:?}, url: {:?})",
                    index, context.site_id, reason, title, url
                );
                return FragmentOutcome::Skipped { index, reason };
            }
        };

        let add_info = self
            .add_info
            .as_ref()
            .and_then(|s| select_list_text(fragment, s));

        FragmentOutcome::Extracted(JobOffer {
            title,
            url,
            company: text_of(&self.company),
            location: text_of(&self.location),
            salary: text_of(&self.salary),
            add_info,
            site_id: context.site_id.clone(),
        })
    }
}

impl ContextualParser for OfferListParser {
    type Output = Extraction;
    type Context = ParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> Self::Output {
        let Some(offer_box) = self.offer_box.as_ref() else {
            warn!(
                "Offer box selector '{}' for '{}' is not a valid CSS selector",
                self.offer_box_source, context.site_id
            );
            return Extraction::default();
        };

        let extraction: Extraction = html
            .select(offer_box)
            .enumerate()
            .map(|(index, fragment)| self.extract_fragment(fragment, index, context))
            .collect();

        if extraction.no_offer_boxes() {
            warn!(
                "No offer boxes found for '{}' with selector '{}'",
                context.site_id, self.offer_box_source
            );
        } else {
            debug!(
                "Extracted {} of {} offer boxes for '{}'",
                extraction.offers.len(),
                extraction.fragments_matched,
                context.site_id
            );
        }

        extraction
    }
}
