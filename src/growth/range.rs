//! Turning user supplied ranges into snapshot timestamps.
//!
//! Runs count backwards from the newest snapshot: `0` is the latest save.
//! Dates are parsed leniently so that a timestamp copied out of `history`
//! or a report header can be pasted straight back in.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::error::{Error, RangeParseError, Result};
use crate::store::SnapshotRepository;

/// Display format for snapshot timestamps in history lines and headers
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f%:z";

pub fn format_timestamp(timestamp: &DateTime<Local>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Pair of relative run indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRange {
    pub from: usize,
    pub to: usize,
}

impl RunRange {
    /// `"N"` is shorthand for `0-N`; `"N-M"` names both runs.
    pub fn parse(input: &str) -> Result<Self, RangeParseError> {
        let token = |t: &str| {
            t.trim().parse::<usize>().map_err(|_| RangeParseError::RunToken {
                input: input.to_string(),
                token: t.to_string(),
            })
        };

        let runs: Vec<&str> = input.split('-').collect();
        match runs.as_slice() {
            [to] => Ok(RunRange { from: 0, to: token(*to)? }),
            [from, to] => Ok(RunRange { from: token(*from)?, to: token(*to)? }),
            _ => Err(RangeParseError::RunShape(input.to_string())),
        }
    }

    /// Number of history entries needed to resolve both runs
    pub fn depth(&self) -> usize {
        self.from.max(self.to).saturating_add(1)
    }
}

/// Pair of absolute timestamps, `"<date> - <date>"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Local>,
    pub to: DateTime<Local>,
}

impl DateRange {
    pub fn parse(input: &str) -> Result<Self, RangeParseError> {
        let dates: Vec<&str> = input.split(" - ").collect();
        match dates.as_slice() {
            [from, to] => Ok(DateRange {
                from: parse_when(from)?,
                to: parse_when(to)?,
            }),
            _ => Err(RangeParseError::DateShape(input.to_string())),
        }
    }
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

// %B accepts abbreviated month names too
const TEXT_FORMATS: &[&str] = &[
    "%B %d %Y %H:%M:%S%.f",
    "%B %d %Y %H:%M",
    "%B %d %Y %I:%M:%S%p",
    "%B %d %Y %I:%M%p",
    "%d %B %Y %H:%M:%S%.f",
    "%d %B %Y %H:%M",
    "%d %B %Y %I:%M:%S%p",
    "%d %B %Y %I:%M%p",
];

const TEXT_DATE_FORMATS: &[&str] = &["%B %d %Y", "%d %B %Y"];

const WEEKDAYS: &[&str] = &[
    "monday", "mon", "tuesday", "tue", "tues", "wednesday", "wed", "thursday", "thu", "thur",
    "thurs", "friday", "fri", "saturday", "sat", "sunday", "sun",
];

const FILLER: &[&str] = &["at", "on", "of"];

/// Parse one side of a date range.
///
/// The numeric layouts printed by `history` and report headers are tried
/// first. Anything else goes through a fuzzy pass: weekday names, commas and
/// filler words are dropped, so `Friday, April 24 2015 4:18pm` works. Square
/// brackets and a trailing `[Weekday]` are ignored. A missing time of day
/// means midnight local time.
pub fn parse_when(input: &str) -> Result<DateTime<Local>, RangeParseError> {
    let cleaned = strip_decorations(input);
    let fail = || RangeParseError::Date(input.trim().to_string());

    if let Some(when) = parse_exact(&cleaned) {
        return Ok(when);
    }

    if let Some(when) = parse_lenient(&cleaned) {
        return Ok(when);
    }

    let words = normalize(&cleaned);
    if words.is_empty() {
        return Err(fail());
    }

    let naive = TEXT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&words, format).ok())
        .or_else(|| {
            TEXT_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(&words, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        });

    match naive {
        Some(naive) => local(&naive).ok_or_else(fail),
        None => parse_lenient(&words).ok_or_else(fail),
    }
}

fn parse_exact(cleaned: &str) -> Option<DateTime<Local>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(dt.with_timezone(&Local));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::<FixedOffset>::parse_from_str(cleaned, format) {
            return Some(dt.with_timezone(&Local));
        }
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(cleaned, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(cleaned, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })?;

    local(&naive)
}

fn parse_lenient(text: &str) -> Option<DateTime<Local>> {
    dateparser::parse_with(text, &Local, NaiveTime::MIN)
        .ok()
        .map(|utc| utc.with_timezone(&Local))
}

fn local(naive: &NaiveDateTime) -> Option<DateTime<Local>> {
    Local.from_local_datetime(naive).earliest()
}

/// Drop weekday names, commas and filler words; glue `am`/`pm` onto the time.
fn normalize(input: &str) -> String {
    let mut words: Vec<String> = Vec::new();

    for word in input.split(|c: char| c == ',' || c.is_whitespace()) {
        let word = word.trim_end_matches('.');
        if word.is_empty() {
            continue;
        }

        let lower = word.to_ascii_lowercase();
        if WEEKDAYS.contains(&lower.as_str()) || FILLER.contains(&lower.as_str()) {
            continue;
        }

        let meridiem = lower.replace('.', "");
        if meridiem == "am" || meridiem == "pm" {
            if let Some(time) = words.last_mut() {
                time.push_str(&meridiem);
                continue;
            }
        }

        words.push(word.to_string());
    }

    words.join(" ")
}

fn strip_decorations(input: &str) -> String {
    let mut s = input.trim();

    // "2015-04-24 16:18:57 [Friday]" as printed by history
    if let Some(open) = s.rfind(" [") {
        let tail = &s[open + 2..];
        if let Some(word) = tail.strip_suffix(']') {
            if !word.is_empty() && word.chars().all(|c| c.is_ascii_alphabetic()) {
                s = &s[..open];
            }
        }
    }

    s.trim_matches(|c: char| c == '[' || c == ']' || c.is_whitespace()).to_string()
}

/// Look up the timestamps of both runs, `(from, to)`.
pub fn resolve_runs<R: SnapshotRepository + ?Sized>(
    repo: &R,
    range: RunRange,
) -> Result<(DateTime<Local>, DateTime<Local>)> {
    let requested = range.depth();
    let history = repo.history(requested)?;

    match (history.get(range.from), history.get(range.to)) {
        (Some(from), Some(to)) => Ok((*from, *to)),
        _ => Err(Error::InsufficientHistory {
            requested,
            available: history.len(),
        }),
    }
}
