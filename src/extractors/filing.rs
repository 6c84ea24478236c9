// src/extractors/filing.rs

// --- Imports ---
use crate::edgar::models::{Filing, PageSize, Timestamp};
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

// --- Constants ---
/// Row text marking a Form 8-K ("Current report") entry in the listing.
pub const CURRENT_REPORT_MARKER: &str = "Current report";
/// Label of the anchor pointing at the HTML filing index.
const HTML_LINK_LABEL: &str = "[html]";

// --- CSS Selectors (Lazy Static) ---
static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tr").expect("Failed to compile ROW_SELECTOR")
});

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a").expect("Failed to compile ANCHOR_SELECTOR")
});

// Acceptance time cell: `<td nowrap="nowrap">2024-01-02<br>10:00:00</td>`
static NOWRAP_CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("td[nowrap]").expect("Failed to compile NOWRAP_CELL_SELECTOR")
});

static BREAK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("br").expect("Failed to compile BREAK_SELECTOR")
});

static INPUT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("input").expect("Failed to compile INPUT_SELECTOR")
});

// --- Regex Patterns ---
// "ACME CORP (0001234567) (Filer)" -> "ACME CORP"
static FILER_ANNOTATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\([^)]*\)\s*\((?:Filer|Subject|Reporting|Filed by)\)\s*")
        .expect("Failed to compile FILER_ANNOTATION_RE")
});

/// Two adjacent listing rows: the company row followed by the filing detail row.
#[derive(Debug, Clone, Copy)]
pub struct RowPair<'a> {
    pub context_row: ElementRef<'a>,
    pub data_row: ElementRef<'a>,
}

/// Rows picked out of one listing page.
#[derive(Debug)]
pub struct RowSelection<'a> {
    pub pairs: Vec<RowPair<'a>>,
    /// How many "Current report" rows the page had, qualifying or not.
    pub current_reports: usize,
}

/// A parsed page of the "latest filings" listing.
pub struct ListingPage {
    document: Html,
}

impl ListingPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Pairs every row with its predecessor and keeps the pairs whose later row is
    /// a current report mentioning `item`. Plain substring checks, in document order.
    pub fn qualifying_pairs(&self, item: &str) -> RowSelection<'_> {
        let rows: Vec<ElementRef> = self.document.select(&ROW_SELECTOR).collect();
        let mut pairs = Vec::new();
        let mut current_reports = 0;

        for window in rows.windows(2) {
            let (context_row, data_row) = (window[0], window[1]);
            let text = data_row.text().collect::<String>();
            if !text.contains(CURRENT_REPORT_MARKER) {
                continue;
            }
            current_reports += 1;
            if text.contains(item) {
                tracing::trace!("Row qualifies for item {}: '{}'", item, text.trim());
                pairs.push(RowPair { context_row, data_row });
            }
        }

        RowSelection { pairs, current_reports }
    }

    /// The listing offers an `<input value="Next {page_size}">` button while more pages remain.
    pub fn has_next_page(&self, page_size: PageSize) -> bool {
        let label = format!("Next {}", page_size);
        self.document
            .select(&INPUT_SELECTOR)
            .any(|input| input.value().attr("value").map(str::trim) == Some(label.as_str()))
    }
}

/// Turns one qualifying row pair into a [`Filing`].
pub struct FilingExtractor {
    base_url: Url,
}

impl FilingExtractor {
    /// `base_url` is the listing URL; filing hrefs are site-relative and resolve against its origin.
    pub fn new(base_url: &str) -> Result<Self, ExtractError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ExtractError::StructureMismatch(format!("invalid listing base URL '{}': {}", base_url, e))
        })?;
        Ok(Self { base_url })
    }

    pub fn extract(&self, pair: RowPair<'_>) -> Result<Filing, ExtractError> {
        let company = self.company_name(pair.context_row)?;
        let timestamp = self.timestamp(pair.data_row)?;
        let url = self.filing_url(pair.data_row)?;
        Ok(Filing::new(company, timestamp, url))
    }

    fn company_name(&self, row: ElementRef<'_>) -> Result<String, ExtractError> {
        let anchor = row.select(&ANCHOR_SELECTOR).next().ok_or_else(|| {
            ExtractError::StructureMismatch("company row has no link".to_string())
        })?;
        let raw = anchor.text().collect::<String>();
        let name = FILER_ANNOTATION_RE.replace_all(&raw, "").trim().to_string();
        if name.is_empty() {
            return Err(ExtractError::StructureMismatch(format!(
                "company link text '{}' has no name",
                raw.trim()
            )));
        }
        Ok(name)
    }

    fn timestamp(&self, row: ElementRef<'_>) -> Result<Timestamp, ExtractError> {
        let cell = row
            .select(&NOWRAP_CELL_SELECTOR)
            .find(|cell| cell.select(&BREAK_SELECTOR).next().is_some())
            .ok_or_else(|| {
                ExtractError::StructureMismatch("detail row has no nowrap date/time cell".to_string())
            })?;
        // Date and time sit either side of the <br>; whitespace around them is markup noise.
        let raw: String = cell.text().flat_map(str::chars).filter(|c| !c.is_whitespace()).collect();
        Timestamp::parse_listing(&raw).map_err(|e| {
            ExtractError::StructureMismatch(format!("unparsable acceptance time '{}': {}", raw, e))
        })
    }

    fn filing_url(&self, row: ElementRef<'_>) -> Result<String, ExtractError> {
        let anchor = row
            .select(&ANCHOR_SELECTOR)
            .find(|a| a.text().collect::<String>().trim() == HTML_LINK_LABEL)
            .ok_or_else(|| {
                ExtractError::StructureMismatch(format!("detail row has no {} link", HTML_LINK_LABEL))
            })?;
        let href = anchor.value().attr("href").ok_or_else(|| {
            ExtractError::StructureMismatch(format!("{} link has no href", HTML_LINK_LABEL))
        })?;
        let url = self.base_url.join(href).map_err(|e| {
            ExtractError::StructureMismatch(format!("cannot resolve filing href '{}': {}", href, e))
        })?;
        // '|' survives URL joining but would split the stored table row.
        Ok(url.as_str().replace('|', "%7C"))
    }
}
