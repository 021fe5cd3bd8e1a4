//! Selector resolution within a parsed fragment
//!
//! Every lookup answers "present value" or "absent". A selector that fails
//! to compile or matches nothing is absent, as is blank element text; nothing
//! here returns an error to the caller. List items are the exception: a blank
//! item still takes an empty slot in the joined list text.

use scraper::{ElementRef, Selector};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use super::{ParsingError, ParsingResult};

/// Attributes that carry link targets and get resolved against the page base
const LINK_ATTRIBUTES: &[&str] = &["href", "src"];

/// Schemes treated as already absolute
const ABSOLUTE_SCHEMES: &[&str] = &["http://", "https://"];

static LIST_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("static selector 'li' is valid"));

/// Compile a CSS selector string
pub fn compile(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, e))
}

/// Compile a selector, logging and discarding failures
pub fn compile_lenient(selector: &str) -> Option<Selector> {
    match compile(selector) {
        Ok(compiled) => Some(compiled),
        Err(e) => {
            debug!("{}", e);
            None
        }
    }
}

/// Visible text of an element with whitespace runs collapsed and trimmed
pub fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ");
    if text.is_empty() { None } else { Some(text) }
}

/// First match's trimmed text
///
/// Whitespace runs inside the text are collapsed to single spaces. Titles
/// read here become part of the `(url, title)` store key, so the same offer
/// keeps the same key when a page reflows its markup.
pub fn text(fragment: ElementRef<'_>, selector: &str) -> Option<String> {
    compile_lenient(selector).and_then(|compiled| select_text(fragment, &compiled))
}

/// First match's trimmed text using a precompiled selector
pub fn select_text(fragment: ElementRef<'_>, selector: &Selector) -> Option<String> {
    fragment.select(selector).next().and_then(element_text)
}

/// First match's attribute value; link attributes are resolved against `base_url`
pub fn attribute(
    fragment: ElementRef<'_>,
    selector: &str,
    attr: &str,
    base_url: Option<&Url>,
) -> Option<String> {
    compile_lenient(selector).and_then(|compiled| select_attribute(fragment, &compiled, attr, base_url))
}

/// Attribute lookup using a precompiled selector
pub fn select_attribute(
    fragment: ElementRef<'_>,
    selector: &Selector,
    attr: &str,
    base_url: Option<&Url>,
) -> Option<String> {
    let raw = fragment.select(selector).next()?.value().attr(attr)?.trim();
    if raw.is_empty() {
        return None;
    }

    if !LINK_ATTRIBUTES.contains(&attr) {
        return Some(raw.to_string());
    }

    match base_url {
        Some(base) => match resolve_url(raw, base) {
            Ok(resolved) => Some(resolved),
            Err(e) => {
                debug!("{}", e);
                None
            }
        },
        None => Some(raw.to_string()),
    }
}

/// List-aware text: joined `li` texts if the first match has any, its own text otherwise
///
/// Every list item takes a slot in the joined value, blank ones included.
pub fn list_text(fragment: ElementRef<'_>, selector: &str) -> Option<String> {
    compile_lenient(selector).and_then(|compiled| select_list_text(fragment, &compiled))
}

/// List-aware text using a precompiled selector
pub fn select_list_text(fragment: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = fragment.select(selector).next()?;
    let mut items = element.select(&LIST_ITEM).peekable();

    if items.peek().is_none() {
        return element_text(element);
    }

    let joined = items
        .map(|item| element_text(item).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(", ");
    Some(joined)
}

/// Whether a link value already carries a recognized scheme
pub fn is_absolute(href: &str) -> bool {
    let lower = href.trim_start().to_ascii_lowercase();
    ABSOLUTE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

/// Resolve a link value against a base URL; absolute values pass through unchanged
pub fn resolve_url(href: &str, base: &Url) -> ParsingResult<String> {
    if is_absolute(href) {
        return Ok(href.to_string());
    }

    base.join(href)
        .map(String::from)
        .map_err(|e| ParsingError::url_resolution_failed(href, e, Some(base.as_str())))
}

/// Scheme + host (+ explicit port) of a page URL, used as the link base
pub fn origin_base(page_url: &Url) -> Option<Url> {
    let host = page_url.host_str()?;
    let origin = match page_url.port() {
        Some(port) => format!("{}://{}:{}/", page_url.scheme(), host, port),
        None => format!("{}://{}/", page_url.scheme(), host),
    };
    Url::parse(&origin).ok()
}
