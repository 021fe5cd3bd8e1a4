//! HTML parsing infrastructure for offer listing pages
//!
//! Selector resolution is kept separate from offer assembly so both can be
//! tested against small HTML fragments.

pub mod context;
pub mod offer_list_parser;
pub mod selector_resolver;

// Re-export public types
pub use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};
pub use context::ParseContext;
pub use offer_list_parser::OfferListParser;

use scraper::Html;

/// Parser over an already parsed document with contextual information
///
/// Implementations degrade malformed input to empty or partial output
/// instead of failing.
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse HTML with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> Self::Output;
}
