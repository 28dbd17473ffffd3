//! Field extractors over a parsed HTML tree.
//!
//! Every extractor takes an `Option<ElementRef>` so that a selector which
//! matched nothing flows through as `None` instead of an error.

use scraper::{ElementRef, Html, Selector};

use crate::compose;
use crate::sanitize::{enforce_https_url, strip_non_numeric};

/// Queryable tree built from a page's markup. Read-only once parsed.
pub struct ParsedDocument {
    html: Html,
}

impl ParsedDocument {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// First element matching `selector`, in document order.
    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    pub fn select_all(&self, selector: &Selector) -> Vec<ElementRef<'_>> {
        self.html.select(selector).collect()
    }
}

/// First descendant of `node` matching `selector`.
pub fn find<'a>(node: Option<ElementRef<'a>>, selector: &Selector) -> Option<ElementRef<'a>> {
    node.and_then(|el| el.select(selector).next())
}

/// All descendants of `node` matching `selector`; empty when `node` is absent.
pub fn find_all<'a>(node: Option<ElementRef<'a>>, selector: &Selector) -> Vec<ElementRef<'a>> {
    node.map(|el| el.select(selector).collect()).unwrap_or_default()
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn inner_text(node: Option<ElementRef<'_>>) -> Option<String> {
    node.and_then(|el| non_empty(&el.text().collect::<String>()))
}

/// Text of every node joined in document order, trimmed once at the ends.
pub fn joined_text(nodes: Vec<ElementRef<'_>>) -> Option<String> {
    non_empty(&nodes.iter().flat_map(|el| el.text()).collect::<String>())
}

pub fn inner_html(node: Option<ElementRef<'_>>) -> Option<String> {
    node.and_then(|el| non_empty(&el.inner_html()))
}

/// Builds an extractor reading attribute `name`.
pub fn attribute(name: &str) -> impl Fn(Option<ElementRef<'_>>) -> Option<String> + '_ {
    move |node| node.and_then(|el| el.value().attr(name)).and_then(non_empty)
}

/// Parses the leading integer of `text`, like `parseInt`.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Inner text, stripped to its numeric characters, parsed as an integer.
pub fn extract_number(node: Option<ElementRef<'_>>) -> Option<i64> {
    compose!(
        |text: Option<String>| text.as_deref().and_then(parse_leading_int),
        |text: Option<String>| text.as_deref().map(strip_non_numeric),
        inner_text
    )(node)
}

/// Attribute `name` with its scheme forced to https.
pub fn extract_url_attribute(name: &str) -> impl Fn(Option<ElementRef<'_>>) -> Option<String> + '_ {
    let read = attribute(name);
    move |node| read(node).as_deref().map(enforce_https_url)
}

/// Maps `extractor` over every element, in order.
pub fn extract_from_elems<'a, T>(
    extractor: impl Fn(ElementRef<'a>) -> T,
) -> impl Fn(Vec<ElementRef<'a>>) -> Vec<T> {
    move |elems| elems.into_iter().map(&extractor).collect()
}

/// Like [`extract_from_elems`], then hands the whole list to `transform`.
pub fn extract_from_elems_with<'a, T, R>(
    extractor: impl Fn(ElementRef<'a>) -> T,
    transform: impl Fn(Vec<T>) -> R,
) -> impl Fn(Vec<ElementRef<'a>>) -> R {
    compose!(transform, extract_from_elems(extractor))
}
