// src/pipeline/merge.rs
use crate::config::OrderCheck;
use crate::edgar::models::Filing;

/// Puts freshly fetched filings in front of the stored ones.
///
/// Only the leading run of `new` that is strictly newer than the newest stored
/// filing is kept; scanning stops at the first filing at or before that cutoff.
/// Both lists are expected newest-first, and every stored filing survives.
pub fn merge(new: &[Filing], old: Option<&[Filing]>) -> Vec<Filing> {
    let old = match old {
        Some(old) if !old.is_empty() => old,
        _ => return new.to_vec(),
    };

    let cutoff = old[0].timestamp;
    let fresh = new
        .iter()
        .take_while(|filing| filing.timestamp > cutoff)
        .cloned();

    let merged: Vec<Filing> = fresh.chain(old.iter().cloned()).collect();
    tracing::debug!(
        "Cutoff {}: {} new filings ahead of {} stored",
        cutoff,
        merged.len() - old.len(),
        old.len()
    );
    merged
}

/// Indices `i` where `filings[i + 1]` is newer than `filings[i]`.
pub fn order_violations(filings: &[Filing]) -> Vec<usize> {
    filings
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[1].timestamp > pair[0].timestamp)
        .map(|(idx, _)| idx)
        .collect()
}

/// Applies the configured order check to a list labelled `what` in logs.
/// Returns the number of violations found.
pub fn check_order(filings: &mut [Filing], what: &str, mode: OrderCheck) -> usize {
    if mode == OrderCheck::Off {
        return 0;
    }

    let violations = order_violations(filings);
    for &idx in &violations {
        tracing::warn!(
            "{} out of order at position {}: {} ({}) precedes {} ({})",
            what,
            idx,
            filings[idx].company,
            filings[idx].timestamp,
            filings[idx + 1].company,
            filings[idx + 1].timestamp
        );
    }

    if mode == OrderCheck::Reorder && !violations.is_empty() {
        // Stable, so equal timestamps keep listing order.
        filings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        tracing::warn!("Re-sorted {} newest-first", what);
    }
    violations.len()
}
