//! Domain module - Core entities and persistence contracts
//!
//! Offers, site descriptors, extraction outcomes and the store trait. Nothing
//! here performs I/O.

pub mod extraction;
pub mod offer;
pub mod repositories;
pub mod site;

pub use extraction::{Extraction, FragmentOutcome, SkipReason, SkippedFragment};
pub use offer::{JobOffer, OfferKey};
pub use repositories::OfferStore;
pub use site::{MissingSelector, RequiredSelectors, SelectorKey, SelectorMap, SiteDescriptor};
