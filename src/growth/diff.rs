//! Snapshot comparison engine.
//!
//! A diff holds `rows(from) - rows(to)` for every label present in the
//! `from` snapshot. Labels missing from `to` count as zero there; labels
//! that only exist in `to` are not reported.

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::provider::Provider;
use crate::store::{row_count, Counts, GroupBy, SnapshotRepository};

/// Per-label delta between two aggregated snapshots
pub fn compare_counts(from: &Counts, to: &Counts) -> Counts {
    from.iter()
        .map(|(label, rows)| (label, rows.saturating_sub(to.get(label).unwrap_or(0))))
        .collect()
}

/// Load both snapshots of `provider` and compare them.
pub fn diff<R: SnapshotRepository + ?Sized>(
    repo: &R,
    provider: Provider,
    from: DateTime<Local>,
    to: DateTime<Local>,
    group_by: GroupBy,
) -> Result<Counts> {
    let from_totals = row_count(&repo.snapshot(from, provider)?, group_by);
    let to_totals = row_count(&repo.snapshot(to, provider)?, group_by);

    log::debug!(
        "{}: comparing {} labels against {}",
        provider.label(),
        from_totals.len(),
        to_totals.len()
    );

    Ok(compare_counts(&from_totals, &to_totals))
}
