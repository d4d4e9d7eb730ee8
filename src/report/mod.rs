pub mod bars;
pub mod json;

use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::Write;

use crate::error::Result;
use crate::growth::{format_timestamp, serialize_timestamp, GrowthReport};
use crate::provider::Provider;
use crate::store::Counts;
use bars::BarChart;

/// Columns used when stdout is not a terminal
pub const FALLBACK_WIDTH: usize = 80;

/// Width to render charts at: the configured override, else the terminal.
pub fn terminal_width(configured: Option<usize>) -> usize {
    configured
        .or_else(|| {
            crossterm::terminal::size()
                .ok()
                .map(|(columns, _)| usize::from(columns))
                .filter(|&columns| columns > 0)
        })
        .unwrap_or(FALLBACK_WIDTH)
}

/// Live row counts taken by `count`, one entry per provider
#[derive(Debug, Clone, Serialize)]
pub struct CountReport {
    #[serde(serialize_with = "serialize_timestamp")]
    pub at: DateTime<Local>,
    /// In display order, secondary provider first
    pub sections: Vec<(Provider, Counts)>,
}

/// Where rendered lines end up. Sinks that cannot show color get plain text.
pub trait Sink {
    fn color(&self) -> bool;
    fn deliver(&mut self, lines: &[String]) -> Result<()>;
}

/// Writes lines to a terminal or any other writer
pub struct Console<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> Console<W> {
    pub fn new(out: W, color: bool) -> Self {
        Console { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl Console<std::io::Stdout> {
    pub fn stdout() -> Self {
        Console::new(std::io::stdout(), true)
    }
}

impl<W: Write> Sink for Console<W> {
    fn color(&self) -> bool {
        self.color
    }

    fn deliver(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

pub fn growth_header(provider: Provider, from: &DateTime<Local>, to: &DateTime<Local>) -> String {
    format!(
        "==== {} [{}] - [{}] ====",
        provider.label(),
        format_timestamp(from),
        format_timestamp(to)
    )
}

pub fn count_header(provider: Provider, at: &DateTime<Local>) -> String {
    format!("==== {} [{}] ====", provider.label(), format_timestamp(at))
}

fn chart(values: &Counts, width: usize, color: bool, out: &mut Vec<String>) {
    let chart = BarChart::new(values, width);
    out.extend(chart.lines().map(|line| if color { line.styled() } else { line.text }));
}

/// Header plus bar chart for every provider section
pub fn render_growth(report: &GrowthReport, width: usize, color: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for section in &report.sections {
        lines.push(growth_header(section.provider, &report.from, &report.to));
        chart(&section.diff, width, color, &mut lines);
    }
    lines
}

pub fn render_counts(report: &CountReport, width: usize, color: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for (provider, counts) in &report.sections {
        lines.push(count_header(*provider, &report.at));
        chart(counts, width, color, &mut lines);
    }
    lines
}

/// `index: timestamp [Weekday]`, newest first
pub fn render_history(history: &[DateTime<Local>]) -> Vec<String> {
    history
        .iter()
        .enumerate()
        .map(|(i, at)| format!("{i}: {} [{}]", format_timestamp(at), at.format("%A")))
        .collect()
}

/// Render a growth report once for the given sink and hand it over.
pub fn deliver_growth(report: &GrowthReport, width: usize, sink: &mut dyn Sink) -> Result<()> {
    let lines = render_growth(report, width, sink.color());
    sink.deliver(&lines)
}
