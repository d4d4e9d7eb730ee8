//! Proportional bar chart for signed values.
//!
//! Every line looks like `label (value): #####`, with labels padded so the
//! bars start in the same column. The largest magnitude fills the space
//! left after the label column and everything else scales against it.

use crossterm::style::Stylize;

use crate::store::Counts;

pub const FILL: char = '#';

/// Color a line is drawn in; never affects widths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Growth,
    Shrink,
    Plain,
}

impl Tone {
    pub fn of(value: i64) -> Self {
        match value {
            v if v > 0 => Tone::Growth,
            v if v < 0 => Tone::Shrink,
            _ => Tone::Plain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarLine {
    pub text: String,
    pub tone: Tone,
    pub bar_len: usize,
}

impl BarLine {
    /// The line with ANSI color applied to the whole of it.
    pub fn styled(&self) -> String {
        match self.tone {
            Tone::Growth => self.text.as_str().green().to_string(),
            Tone::Shrink => self.text.as_str().red().to_string(),
            Tone::Plain => self.text.clone(),
        }
    }
}

fn prefix(label: &str, value: i64) -> String {
    format!("{label}({value}): ")
}

pub struct BarChart<'a> {
    values: &'a Counts,
    label_width: usize,
    bar_width: usize,
    max_abs: u64,
}

impl<'a> BarChart<'a> {
    pub fn new(values: &'a Counts, width: usize) -> Self {
        let label_width = values
            .iter()
            .map(|(label, value)| prefix(label, value).chars().count())
            .max()
            .unwrap_or(0);

        let max_abs = values.values().map(i64::unsigned_abs).max().unwrap_or(0);

        BarChart {
            values,
            label_width,
            bar_width: width.saturating_sub(label_width),
            max_abs,
        }
    }

    pub fn label_width(&self) -> usize {
        self.label_width
    }

    pub fn bar_width(&self) -> usize {
        self.bar_width
    }

    /// Columns per unit of change; 1 when every value is zero.
    pub fn scale(&self) -> f64 {
        if self.max_abs == 0 {
            1.0
        } else {
            self.bar_width as f64 / self.max_abs as f64
        }
    }

    /// `floor(|value| * scale)`, computed in integers so the largest
    /// value always fills the bar column exactly.
    fn bar_len(&self, value: i64) -> usize {
        if self.max_abs == 0 {
            return 0;
        }
        let len = u128::from(value.unsigned_abs()) * self.bar_width as u128 / u128::from(self.max_abs);
        usize::try_from(len).unwrap_or(self.bar_width)
    }

    pub fn line(&self, label: &str, value: i64) -> BarLine {
        let prefix_len = prefix(label, value).chars().count();
        let pad = " ".repeat(self.label_width.saturating_sub(prefix_len));
        let bar_len = self.bar_len(value);
        let bars: String = std::iter::repeat(FILL).take(bar_len).collect();

        BarLine {
            text: format!("{label}{pad}({value}): {bars}"),
            tone: Tone::of(value),
            bar_len,
        }
    }

    /// Lines in insertion order. Each call starts over from the first label.
    pub fn lines(&self) -> impl Iterator<Item = BarLine> + '_ {
        self.values.iter().map(move |(label, value)| self.line(label, value))
    }
}
