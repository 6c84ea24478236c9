// src/edgar/models.rs
use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

/// Canonical rendering used in the persisted document, e.g. `2024-01-02 10:00:00`.
pub const CANONICAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Layout of the acceptance time on the listing page once the `<br>` is dropped,
/// e.g. `2024-01-0210:00:00`.
pub const LISTING_TIMESTAMP_FORMAT: &str = "%Y-%m-%d%H:%M:%S";

/// Page sizes the EDGAR "latest filings" listing accepts.
pub const ALLOWED_PAGE_SIZES: [usize; 5] = [10, 20, 40, 80, 100];

/// Acceptance time of a filing. Ordering is chronological, which for the
/// canonical format is the same as lexicographic ordering of the rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Parses the compact listing layout (date immediately followed by time).
    pub fn parse_listing(raw: &str) -> Result<Self, chrono::ParseError> {
        NaiveDateTime::parse_from_str(raw.trim(), LISTING_TIMESTAMP_FORMAT).map(Self)
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDateTime::parse_from_str(s.trim(), CANONICAL_TIMESTAMP_FORMAT).map(Self)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(CANONICAL_TIMESTAMP_FORMAT))
    }
}

/// One Form 8-K filing pulled from the listing (or read back from the document).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filing {
    pub company: String,
    pub timestamp: Timestamp,
    pub url: String, // Absolute URL of the HTML filing index
}

impl Filing {
    pub fn new(company: impl Into<String>, timestamp: Timestamp, url: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            timestamp,
            url: url.into(),
        }
    }
}

/// Number of filings per listing page; only the values in [`ALLOWED_PAGE_SIZES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(usize);

impl PageSize {
    pub fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for PageSize {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        if ALLOWED_PAGE_SIZES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!("page size must be one of {:?}, got {}", ALLOWED_PAGE_SIZES, value))
        }
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid page size '{}': {}", s, e))?;
        Self::try_from(value)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position in the paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub offset: usize,
    pub page_size: PageSize,
}

impl PageCursor {
    pub fn start(page_size: PageSize) -> Self {
        Self { offset: 0, page_size }
    }

    pub fn advance(self) -> Self {
        Self {
            offset: self.offset + self.page_size.get(),
            page_size: self.page_size,
        }
    }

    /// 1-based page number, used in logs and errors.
    pub fn page_number(&self) -> usize {
        self.offset / self.page_size.get() + 1
    }
}
