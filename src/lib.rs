//! Offer Scraper - configuration-driven job offer scraping
//!
//! Listing pages are described by per-site CSS selector maps. Each run fetches
//! every configured page, extracts offers, stores the ones not seen before and
//! reports them.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod test_utils;
