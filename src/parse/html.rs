//! HTML link extractor
//!
//! Extracts hyperlinks from HTML documents as records, resolving relative
//! hrefs against a base URL. The underlying parser is lenient (as browsers
//! are), so tag soup still yields whatever links it contains.

use crate::parse::{Cursor, Record, ResponseParser};
use crate::ParseError;
use scraper::{Html, Selector};
use url::Url;

/// Extracts `<a href>` links from HTML response bodies
#[derive(Debug, Clone)]
pub struct HtmlLinkParser {
    base_url: Url,
}

impl HtmlLinkParser {
    /// Creates a parser resolving relative links against `base_url`
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }
}

impl ResponseParser for HtmlLinkParser {
    /// Extracts all followable links
    ///
    /// # Link Extraction Rules
    ///
    /// **Include:** `<a href="...">` anywhere in the document.
    ///
    /// **Exclude:**
    /// - `javascript:`, `mailto:`, `tel:` links
    /// - Data URIs
    /// - Fragment-only hrefs (same-page anchors)
    /// - Anything that resolves to a non-HTTP(S) URL
    fn parse(&self, body: &str) -> Result<Vec<Record>, ParseError> {
        let document = Html::parse_document(body);

        let selector = Selector::parse("a[href]")
            .map_err(|e| ParseError::Malformed(format!("selector error: {e:?}")))?;

        let mut records = Vec::new();
        for element in document.select(&selector) {
            let href = match element.value().attr("href") {
                Some(href) => href,
                None => continue,
            };

            if let Some(url) = resolve_link(href, &self.base_url) {
                let text: String = element.text().collect::<String>().trim().to_string();
                records.push(Record::Link {
                    url,
                    text: (!text.is_empty()).then_some(text),
                });
            }
        }

        Ok(records)
    }

    /// HTML documents carry no continuation cursor
    fn next_cursor(&self, _body: &str) -> Result<Option<Cursor>, ParseError> {
        Ok(None)
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Fragment-only links point back at the same page
    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
