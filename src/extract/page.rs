//! Parsed-document queries used by the extraction cascade.
//!
//! Every query returns `Option<String>` with whitespace collapsed and `None`
//! for empty text, so cascade steps can chain them without re-checking.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static SEL_H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static SEL_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static SEL_META: Lazy<Selector> = Lazy::new(|| Selector::parse("meta[property]").unwrap());
static SEL_SCRIPT: Lazy<Selector> = Lazy::new(|| Selector::parse("script[type]").unwrap());
static SEL_ITEMPROP: Lazy<Selector> = Lazy::new(|| Selector::parse("[itemprop]").unwrap());

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// An attribute whose value must contain `needle` (ASCII case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub attr: &'static str,
    pub needle: &'static str,
}

impl Marker {
    pub const fn new(attr: &'static str, needle: &'static str) -> Self {
        Self { attr, needle }
    }

    fn matches(&self, el: &ElementRef<'_>) -> bool {
        el.value()
            .attr(self.attr)
            .map(|v| v.to_ascii_lowercase().contains(self.needle))
            .unwrap_or(false)
    }
}

/// Collapse whitespace runs to one space and trim; `None` if nothing is left.
pub fn normalize_text(raw: &str) -> Option<String> {
    let collapsed = RE_WHITESPACE.replace_all(raw, " ");
    let trimmed = collapsed.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn element_text(el: ElementRef<'_>) -> Option<String> {
    normalize_text(&el.text().collect::<String>())
}

/// A parsed HTML document.
pub struct Page {
    html: Html,
}

impl Page {
    /// Parse leniently; malformed markup still yields a (possibly empty) tree.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Text of the first `<h1>` that has any.
    pub fn first_heading(&self) -> Option<String> {
        self.html.select(&SEL_H1).find_map(element_text)
    }

    /// Text of the document `<title>`.
    pub fn title_tag(&self) -> Option<String> {
        self.html.select(&SEL_TITLE).next().and_then(element_text)
    }

    /// `content` of the first `<meta property="…">` with a non-empty value.
    pub fn meta_property(&self, property: &str) -> Option<String> {
        self.html
            .select(&SEL_META)
            .filter(|el| el.value().attr("property") == Some(property))
            .find_map(|el| el.value().attr("content").and_then(normalize_text))
    }

    /// Raw bodies of every `<script type="application/ld+json">`.
    pub fn ld_json_blocks(&self) -> Vec<String> {
        self.html
            .select(&SEL_SCRIPT)
            .filter(|el| {
                el.value()
                    .attr("type")
                    .map(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
                    .unwrap_or(false)
            })
            .map(|el| el.text().collect::<String>())
            .filter(|body| !body.trim().is_empty())
            .collect()
    }

    /// Text of the first element matching `markers`, tried in list order.
    ///
    /// For each marker in turn the document is scanned in order; the first
    /// matching element with text wins. A later marker is only consulted when
    /// no element matches an earlier one.
    pub fn first_marked(&self, markers: &[Marker]) -> Option<String> {
        markers.iter().find_map(|marker| {
            self.html
                .root_element()
                .descendants()
                .filter_map(ElementRef::wrap)
                .filter(|el| marker.matches(el))
                .find_map(element_text)
        })
    }

    /// Schema.org microdata: the `name` inside a `hiringOrganization` scope.
    pub fn hiring_organization_name(&self) -> Option<String> {
        self.html
            .select(&SEL_ITEMPROP)
            .filter(|el| has_itemprop(el, "hiringOrganization"))
            .find_map(|org| {
                org.select(&SEL_ITEMPROP)
                    .filter(|el| has_itemprop(el, "name"))
                    .find_map(element_text)
            })
    }
}

fn has_itemprop(el: &ElementRef<'_>, prop: &str) -> bool {
    el.value()
        .attr("itemprop")
        .map(|v| v.split_whitespace().any(|p| p == prop))
        .unwrap_or(false)
}
