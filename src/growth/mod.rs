//! Growth between two snapshots.
//!
//! Resolves a run or date range to two timestamps, diffs both providers and
//! tracks the extremes used for threshold alerts. The resulting
//! `GrowthReport` is computed once and rendered to every sink.

pub mod diff;
pub mod range;
pub mod threshold;

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

use crate::error::Result;
use crate::provider::Provider;
use crate::store::{Counts, GroupBy, SnapshotRepository};
use threshold::Extremes;

pub use range::{format_timestamp, DateRange, RunRange};
pub use threshold::{should_alert, Thresholds};

#[derive(Debug, Clone, Serialize)]
pub struct GrowthSection {
    pub provider: Provider,
    pub diff: Counts,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrowthReport {
    #[serde(serialize_with = "serialize_timestamp")]
    pub from: DateTime<Local>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub to: DateTime<Local>,
    /// In display order, secondary provider first
    pub sections: Vec<GrowthSection>,
    pub extremes: Extremes,
}

impl GrowthReport {
    pub fn section(&self, provider: Provider) -> Option<&Counts> {
        self.sections
            .iter()
            .find(|s| s.provider == provider)
            .map(|s| &s.diff)
    }

    pub fn should_alert(&self, thresholds: Thresholds) -> bool {
        thresholds.is_configured() && should_alert(thresholds, self.extremes)
    }
}

pub(crate) fn serialize_timestamp<S: Serializer>(
    timestamp: &DateTime<Local>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(timestamp))
}

/// Diff both providers between `from` and `to`.
///
/// Providers are fetched primary first; sections come back in report order.
pub fn compare<R: SnapshotRepository + ?Sized>(
    repo: &R,
    from: DateTime<Local>,
    to: DateTime<Local>,
    group_by: GroupBy,
) -> Result<GrowthReport> {
    let mut extremes = Extremes::default();
    let mut diffs = Vec::with_capacity(2);

    for provider in [Provider::Primary, Provider::Secondary] {
        let diff = diff::diff(repo, provider, from, to, group_by)?;
        extremes.observe(&diff);
        diffs.push(GrowthSection { provider, diff });
    }

    let order = Provider::report_order();
    diffs.sort_by_key(|s| order.iter().position(|p| *p == s.provider));

    Ok(GrowthReport {
        from,
        to,
        sections: diffs,
        extremes,
    })
}

/// Growth between two runs counted back from the latest snapshot.
pub fn compare_runs<R: SnapshotRepository + ?Sized>(
    repo: &R,
    range: RunRange,
    group_by: GroupBy,
) -> Result<GrowthReport> {
    let (from, to) = range::resolve_runs(repo, range)?;
    log::info!("comparing run {} against run {}", range.from, range.to);
    compare(repo, from, to, group_by)
}

/// Growth between two absolute snapshot timestamps.
pub fn compare_dates<R: SnapshotRepository + ?Sized>(
    repo: &R,
    range: DateRange,
    group_by: GroupBy,
) -> Result<GrowthReport> {
    compare(repo, range.from, range.to, group_by)
}
