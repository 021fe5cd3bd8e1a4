//! Explicit outcomes of extracting offers from one listing page
//!
//! Skip decisions are returned as values so callers and tests can inspect
//! them instead of reading log output.

use serde::Serialize;

use crate::domain::offer::JobOffer;

/// Why a matched offer fragment did not become a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    MissingTitle,
    MissingUrl,
    MissingTitleAndUrl,
}

impl SkipReason {
    pub const fn from_presence(has_title: bool, has_url: bool) -> Option<Self> {
        match (has_title, has_url) {
            (true, true) => None,
            (false, true) => Some(Self::MissingTitle),
            (true, false) => Some(Self::MissingUrl),
            (false, false) => Some(Self::MissingTitleAndUrl),
        }
    }
}

/// Result of processing a single matched fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentOutcome {
    Extracted(JobOffer),
    Skipped { index: usize, reason: SkipReason },
}

/// A fragment that was matched but not materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkippedFragment {
    pub index: usize,
    pub reason: SkipReason,
}

/// Offers and skips from one page, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub offers: Vec<JobOffer>,
    pub skipped: Vec<SkippedFragment>,
    pub fragments_matched: usize,
}

impl Extraction {
    /// True when the offer box selector matched nothing
    pub const fn no_offer_boxes(&self) -> bool {
        self.fragments_matched == 0
    }

    pub fn push(&mut self, outcome: FragmentOutcome) {
        self.fragments_matched += 1;
        match outcome {
            FragmentOutcome::Extracted(offer) => self.offers.push(offer),
            FragmentOutcome::Skipped { index, reason } => {
                self.skipped.push(SkippedFragment { index, reason });
            }
        }
    }
}

impl FromIterator<FragmentOutcome> for Extraction {
    fn from_iter<I: IntoIterator<Item = FragmentOutcome>>(iter: I) -> Self {
        let mut extraction = Self::default();
        for outcome in iter {
            extraction.push(outcome);
        }
        extraction
    }
}
