//! Job title and company extraction from arbitrary listing HTML.
//!
//! Each field is resolved by an ordered cascade of resolver functions. Every
//! resolver returns `Option<String>`; the first `Some` wins and later
//! resolvers are never consulted, even if they would also match. When every
//! resolver declines, a fallback derived from the URL host is used, so
//! [`extract`] always returns two non-empty strings.
//!
//! ## Title cascade
//!
//! | # | Source |
//! |---|--------|
//! | 1 | JSON-LD `JobPosting.title` |
//! | 2 | first `<h1>` with text |
//! | 3 | ATS markers (`data-qa`/`class` containing `job-title`, …) |
//! | 4 | `og:title` or `<title>`, cut at the first `" - "` or `"|"` |
//! | – | `"Job from {host}"` |
//!
//! ## Company cascade
//!
//! | # | Source |
//! |---|--------|
//! | 1 | Workday subdomain brand (pre-empts everything else on that host) |
//! | 2 | JSON-LD `JobPosting.hiringOrganization.name` |
//! | 3 | `og:site_name` |
//! | 4 | microdata `hiringOrganization` → `name` |
//! | 5 | ATS markers (`company-name`, `posting-company`, …) |
//! | 6 | page title after the last `"|"`, minus careers/jobs/hiring words |
//! | 7 | page title after `" at "`, up to the next `"|"` |
//! | – | second-to-last host label, capitalised |

pub mod host;
pub mod page;
pub mod structured;

use once_cell::sync::Lazy;
use page::{Marker, Page};
use regex::Regex;
use serde::{Deserialize, Serialize};
use structured::JobPosting;
use tracing::debug;

/// Title markers, tried in this order.
pub const TITLE_MARKERS: &[Marker] = &[
    Marker::new("data-qa", "job-title"),
    Marker::new("class", "job-title"),
    Marker::new("class", "posting-headline"),
    Marker::new("class", "job-header-title"),
    Marker::new("class", "job-title-text"),
];

/// Company markers, tried in this order.
pub const COMPANY_MARKERS: &[Marker] = &[
    Marker::new("data-qa", "company-name"),
    Marker::new("class", "company-name"),
    Marker::new("class", "posting-company"),
    Marker::new("class", "job-header-company"),
];

static RE_SUFFIX_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(careers?|jobs?|hiring)\b").unwrap());

/// Which title step produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TitleSource {
    StructuredData,
    Heading,
    AtsMarker,
    PageTitle,
    HostFallback,
    /// Replaced by a human after extraction.
    Manual,
}

/// Which company step produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanySource {
    AtsHost,
    StructuredData,
    SiteName,
    SchemaMarkup,
    AtsMarker,
    TitlePipe,
    TitleAt,
    HostFallback,
    /// Replaced by a human after extraction.
    Manual,
}

/// Best-effort title and company for a listing. Both fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub title: String,
    pub company: String,
    pub title_source: TitleSource,
    pub company_source: CompanySource,
}

/// Everything the resolvers read, computed once per page.
pub struct Signals {
    page: Page,
    host: Option<String>,
    posting: Option<JobPosting>,
    page_title: Option<String>,
}

impl Signals {
    pub fn new(html: &str, source_url: &str) -> Self {
        let page = Page::parse(html);
        let blocks = page.ld_json_blocks();
        let posting = structured::find_job_posting(blocks.iter().map(String::as_str));
        let page_title = page
            .meta_property("og:title")
            .or_else(|| page.title_tag());
        Self {
            host: host::hostname(source_url),
            page,
            posting,
            page_title,
        }
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// `og:title`, else `<title>`; shared by title step 4 and company steps 6–7.
    pub fn page_title(&self) -> Option<&str> {
        self.page_title.as_deref()
    }
}

type Resolver = fn(&Signals) -> Option<String>;

const TITLE_CASCADE: &[(TitleSource, Resolver)] = &[
    (TitleSource::StructuredData, title_from_structured_data),
    (TitleSource::Heading, title_from_heading),
    (TitleSource::AtsMarker, title_from_markers),
    (TitleSource::PageTitle, title_from_page_title),
];

const COMPANY_CASCADE: &[(CompanySource, Resolver)] = &[
    (CompanySource::AtsHost, company_from_ats_host),
    (CompanySource::StructuredData, company_from_structured_data),
    (CompanySource::SiteName, company_from_site_name),
    (CompanySource::SchemaMarkup, company_from_schema_markup),
    (CompanySource::AtsMarker, company_from_markers),
    (CompanySource::TitlePipe, company_from_title_pipe),
    (CompanySource::TitleAt, company_from_title_at),
];

/// Extract a title and company from `html` served at `source_url`. Never fails.
pub fn extract(html: &str, source_url: &str) -> ExtractionResult {
    let signals = Signals::new(html, source_url);

    let (title_source, title) = resolve(TITLE_CASCADE, &signals).unwrap_or_else(|| {
        (
            TitleSource::HostFallback,
            format!("Job from {}", signals.host().unwrap_or("Unknown")),
        )
    });
    let (company_source, company) = resolve(COMPANY_CASCADE, &signals).unwrap_or_else(|| {
        (
            CompanySource::HostFallback,
            host::company_from_host(signals.host()),
        )
    });

    debug!(
        "Extracted title {:?} via {:?}, company {:?} via {:?}",
        title, title_source, company, company_source
    );

    ExtractionResult {
        title,
        company,
        title_source,
        company_source,
    }
}

/// First resolver in `cascade` that yields non-empty text.
pub fn resolve<S: Copy>(cascade: &[(S, Resolver)], signals: &Signals) -> Option<(S, String)> {
    cascade.iter().find_map(|(source, resolver)| {
        resolver(signals)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|v| (*source, v))
    })
}

// ── Title resolvers ──────────────────────────────────────────────────────

fn title_from_structured_data(s: &Signals) -> Option<String> {
    s.posting.as_ref().and_then(|p| p.title.clone())
}

fn title_from_heading(s: &Signals) -> Option<String> {
    s.page.first_heading()
}

fn title_from_markers(s: &Signals) -> Option<String> {
    s.page.first_marked(TITLE_MARKERS)
}

fn title_from_page_title(s: &Signals) -> Option<String> {
    s.page_title().and_then(strip_title_suffix)
}

// ── Company resolvers ────────────────────────────────────────────────────

fn company_from_ats_host(s: &Signals) -> Option<String> {
    s.host().and_then(host::workday_brand)
}

fn company_from_structured_data(s: &Signals) -> Option<String> {
    s.posting.as_ref().and_then(|p| p.hiring_organization.clone())
}

fn company_from_site_name(s: &Signals) -> Option<String> {
    s.page.meta_property("og:site_name")
}

fn company_from_schema_markup(s: &Signals) -> Option<String> {
    s.page.hiring_organization_name()
}

fn company_from_markers(s: &Signals) -> Option<String> {
    s.page.first_marked(COMPANY_MARKERS)
}

fn company_from_title_pipe(s: &Signals) -> Option<String> {
    s.page_title().and_then(company_after_last_pipe)
}

fn company_from_title_at(s: &Signals) -> Option<String> {
    s.page_title().and_then(company_after_at)
}

// ── Page-title text rules ────────────────────────────────────────────────

/// `"Senior Engineer - Acme Inc"` → `"Senior Engineer"`; also cuts at `"|"`.
pub fn strip_title_suffix(title: &str) -> Option<String> {
    let head = title.split(" - ").next().unwrap_or(title);
    let head = head.split('|').next().unwrap_or(head);
    page::normalize_text(head)
}

/// `"Role | Acme Careers"` → `"Acme"`.
pub fn company_after_last_pipe(title: &str) -> Option<String> {
    let (_, right) = title.rsplit_once('|')?;
    let cleaned = RE_SUFFIX_WORDS.replace_all(right, "");
    trim_separators(&cleaned)
}

/// `"Role at Acme | Careers"` → `"Acme"`.
pub fn company_after_at(title: &str) -> Option<String> {
    let (_, after) = title.split_once(" at ")?;
    let after = after.split('|').next().unwrap_or(after);
    trim_separators(after)
}

fn trim_separators(text: &str) -> Option<String> {
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '-' || c == '|');
    page::normalize_text(trimmed)
}
