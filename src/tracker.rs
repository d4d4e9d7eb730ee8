//! The top level operations: save, history, growth, dates and count.

use chrono::{DateTime, Local, SubsecRound};

use crate::connector::Connector;
use crate::error::Result;
use crate::growth::{self, DateRange, GrowthReport, RunRange, Thresholds};
use crate::provider::Provider;
use crate::report::{self, CountReport, Sink};
use crate::store::{row_count, GroupBy, SnapshotRepository};

pub struct Tracker<S: SnapshotRepository> {
    store: S,
    primary: Box<dyn Connector>,
    secondary: Box<dyn Connector>,
    group_by: GroupBy,
}

impl<S: SnapshotRepository> Tracker<S> {
    pub fn new(
        store: S,
        primary: Box<dyn Connector>,
        secondary: Box<dyn Connector>,
        group_by: GroupBy,
    ) -> Self {
        debug_assert_eq!(primary.provider(), Provider::Primary);
        debug_assert_eq!(secondary.provider(), Provider::Secondary);
        Tracker {
            store,
            primary,
            secondary,
            group_by,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn connector(&self, provider: Provider) -> &dyn Connector {
        match provider {
            Provider::Primary => self.primary.as_ref(),
            Provider::Secondary => self.secondary.as_ref(),
        }
    }

    /// Capture both servers and store them under `at`, returning the
    /// timestamp as stored.
    pub fn save(&mut self, at: DateTime<Local>) -> Result<DateTime<Local>> {
        let at = at.trunc_subsecs(6);

        let mut tables = self.primary.list_tables()?;
        tables.extend(self.secondary.list_tables()?);

        let written = self.store.save(&tables, at)?;
        log::info!("saved {written} table counts at {}", growth::format_timestamp(&at));
        Ok(at)
    }

    pub fn history(&self, count: usize) -> Result<Vec<DateTime<Local>>> {
        self.store.history(count)
    }

    /// Growth between two runs, e.g. `"3"` or `"2-5"`.
    pub fn growth(&self, range: &str) -> Result<GrowthReport> {
        let range = RunRange::parse(range)?;
        growth::compare_runs(&self.store, range, self.group_by)
    }

    /// Growth between two timestamps, `"<date> - <date>"`.
    pub fn dates(&self, range: &str) -> Result<GrowthReport> {
        let range = DateRange::parse(range)?;
        growth::compare_dates(&self.store, range, self.group_by)
    }

    /// Live counts from both servers, nothing is stored.
    pub fn count(&self, at: DateTime<Local>) -> Result<CountReport> {
        let mut totals = Vec::with_capacity(2);
        for provider in [Provider::Primary, Provider::Secondary] {
            let tables = self.connector(provider).list_tables()?;
            totals.push((provider, row_count(&tables, self.group_by)));
        }

        let order = Provider::report_order();
        totals.sort_by_key(|(provider, _)| order.iter().position(|p| p == provider));

        Ok(CountReport {
            at,
            sections: totals,
        })
    }
}

/// Hand `report` to `sink` when the thresholds are crossed.
///
/// Returns whether an alert went out.
pub fn alert_if_crossed(
    report: &GrowthReport,
    thresholds: Thresholds,
    width: usize,
    sink: &mut dyn Sink,
) -> Result<bool> {
    if !report.should_alert(thresholds) {
        log::debug!(
            "thresholds not crossed (low {}, high {})",
            report.extremes.low,
            report.extremes.high
        );
        return Ok(false);
    }

    log::warn!(
        "row change threshold crossed (low {}, high {}), sending alert",
        report.extremes.low,
        report.extremes.high
    );
    report::deliver_growth(report, width, sink)?;
    Ok(true)
}
