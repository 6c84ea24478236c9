// src/pipeline/mod.rs
pub mod merge;

use chrono::NaiveDateTime;

use crate::config::{Config, OrderCheck};
use crate::edgar::{ListingClient, Paginator};
use crate::storage::document::{self, DocumentHeader};
use crate::storage::{RemoteStore, WriteOutcome};
use crate::utils::AppError;

/// What a run did, for the closing log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: usize,
    pub stored: usize,
    pub total: usize,
    /// `None` on a dry run.
    pub outcome: Option<WriteOutcome>,
}

/// Fetch -> merge -> write, in that order, stopping at the first failure so the
/// stored document is only replaced after a complete fetch.
pub struct Pipeline<S> {
    config: Config,
    listing: ListingClient,
    store: S,
}

impl<S: RemoteStore> Pipeline<S> {
    pub fn new(config: Config, store: S) -> Result<Self, AppError> {
        let listing = ListingClient::new(config.listing.clone())?;
        Ok(Self {
            config,
            listing,
            store,
        })
    }

    /// Runs one check; `checked_at` goes into the document's "Last checked" line.
    pub async fn run(&self, checked_at: NaiveDateTime) -> Result<RunSummary, AppError> {
        let location = self.store.location();

        tracing::info!("Retrieving existing SEC filings from {}.", location);
        let existing = self.store.read().await?;
        match &existing {
            Some(doc) => tracing::info!("Found {} stored filings.", doc.filings.len()),
            None => tracing::info!("No stored filings; {} will be created.", location),
        }

        tracing::info!("Retrieving new SEC filings with item {}.", self.config.item);
        let paginator = Paginator::new(&self.listing, self.config.skip_malformed_rows)?;
        let mut new_filings = paginator.fetch(&self.config.item).await?;
        tracing::info!("Done retrieving new SEC filings: {} matched.", new_filings.len());

        merge::check_order(&mut new_filings, "new filings", self.config.order_check);

        let old_filings = existing.as_ref().map(|doc| doc.filings.as_slice());
        let mut merged = merge::merge(&new_filings, old_filings);
        let stored = old_filings.map_or(0, <[_]>::len);

        // The merged list is never re-sorted; stored rows keep their order.
        let merged_check = match self.config.order_check {
            OrderCheck::Off => OrderCheck::Off,
            _ => OrderCheck::Flag,
        };
        merge::check_order(&mut merged, "merged filings", merged_check);

        tracing::info!(
            "Final list has {} filings ({} new, {} stored).",
            merged.len(),
            merged.len() - stored,
            stored
        );

        let header = DocumentHeader::new(self.config.item.clone(), checked_at);
        let mut summary = RunSummary {
            fetched: new_filings.len(),
            stored,
            total: merged.len(),
            outcome: None,
        };

        if self.config.dry_run {
            tracing::info!(
                "Dry run; not writing {}. Document would be:\n{}",
                location,
                document::render_document(&header, &merged)
            );
            return Ok(summary);
        }

        tracing::info!("Saving filings to {}.", location);
        let revision = existing.as_ref().map(|doc| &doc.revision);
        let outcome = self.store.write(&header, &merged, revision).await?;
        summary.outcome = Some(outcome);
        Ok(summary)
    }
}
