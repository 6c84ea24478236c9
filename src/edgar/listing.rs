// src/edgar/listing.rs
use crate::edgar::client::ListingClient;
use crate::edgar::models::{Filing, PageCursor, PageSize};
use crate::extractors::filing::{FilingExtractor, ListingPage};
use crate::utils::error::EdgarError;

/// What one listing page contributed.
#[derive(Debug)]
struct PageScan {
    filings: Vec<Filing>,
    has_next: bool,
}

/// Walks the listing from offset 0 until no "Next" button is offered.
pub struct Paginator<'a> {
    client: &'a ListingClient,
    extractor: FilingExtractor,
    skip_malformed_rows: bool,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a ListingClient, skip_malformed_rows: bool) -> Result<Self, EdgarError> {
        let extractor = FilingExtractor::new(&client.config().url)
            .map_err(|source| EdgarError::Extract { page: 0, source })?;
        Ok(Self {
            client,
            extractor,
            skip_malformed_rows,
        })
    }

    /// Collects every filing for `item`, newest-first as the listing delivers them.
    /// The first failing page aborts the walk; no partial result is returned.
    pub async fn fetch(&self, item: &str) -> Result<Vec<Filing>, EdgarError> {
        let page_size = self.client.config().page_size;
        let mut cursor = PageCursor::start(page_size);
        let mut filings = Vec::new();

        loop {
            let html = self.client.fetch_page(cursor).await?;
            let scan = self.scan_page(&html, item, cursor.page_number(), page_size)?;
            filings.extend(scan.filings);

            if !scan.has_next {
                tracing::debug!("No next page after page {}", cursor.page_number());
                break;
            }
            cursor = cursor.advance();
            tracing::debug!("Advancing to offset {}", cursor.offset);
        }

        Ok(filings)
    }

    fn scan_page(
        &self,
        html: &str,
        item: &str,
        page: usize,
        page_size: PageSize,
    ) -> Result<PageScan, EdgarError> {
        let listing = ListingPage::parse(html);
        let selection = listing.qualifying_pairs(item);
        tracing::info!(
            "Page {}: {} current reports, {} with item {}",
            page,
            selection.current_reports,
            selection.pairs.len(),
            item
        );

        let mut filings = Vec::with_capacity(selection.pairs.len());
        for pair in selection.pairs {
            match self.extractor.extract(pair) {
                Ok(filing) => filings.push(filing),
                Err(source) if self.skip_malformed_rows => {
                    tracing::error!("Skipping malformed row on page {}: {}", page, source);
                }
                Err(source) => return Err(EdgarError::Extract { page, source }),
            }
        }

        Ok(PageScan {
            filings,
            has_next: listing.has_next_page(page_size),
        })
    }
}
