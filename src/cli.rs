use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::growth::Thresholds;

#[derive(Parser)]
#[command(name = "dbtracker")]
#[command(about = "Queries MySQL and PostgreSQL for stats")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Use a custom configuration file path
    #[arg(long, short = 'C', global = true)]
    pub config: Option<PathBuf>,

    /// Turn logging down to errors only
    #[arg(long, short = 's', global = true, default_value_t = false)]
    pub silent: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate and save database stats
    Save,

    /// List the timestamps of the last N saved runs
    History(HistoryArgs),

    /// Graph growth between two runs, e.g. `3-4` or `4` (same as `0-4`)
    Growth(GrowthArgs),

    /// Get current row counts without saving
    Count(CountArgs),

    /// Graph growth between two saved timestamps,
    /// e.g. "2015-04-24 16:18:57.166095-07:00 - 2015-04-22 17:00:50.746688-07:00"
    Dates(DatesArgs),
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Number of runs to list
    pub count: usize,
}

#[derive(Args)]
pub struct ThresholdArgs {
    /// Send an alert when the largest decrease reaches this many rows
    /// (0 only takes effect together with a non-zero --max)
    #[arg(long, allow_negative_numbers = true)]
    pub min: Option<i64>,

    /// Send an alert when the largest increase reaches this many rows
    /// (0 only takes effect together with a non-zero --min)
    #[arg(long, allow_negative_numbers = true)]
    pub max: Option<i64>,
}

impl ThresholdArgs {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            min: self.min,
            max: self.max,
        }
    }
}

#[derive(Args)]
pub struct GrowthArgs {
    /// Run range, newest run is 0
    pub range: String,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// Output as JSON instead of bars
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct DatesArgs {
    /// Two timestamps separated by " - "
    pub range: String,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// Output as JSON instead of bars
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct CountArgs {
    /// Output as JSON instead of bars
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = parse(&["dbtracker"]);
        assert!(cli.command.is_none());
        assert!(!cli.silent);
    }

    #[test]
    fn growth_with_negative_min() {
        let cli = parse(&["dbtracker", "growth", "1-3", "--min", "-500", "--max", "2000"]);
        let Some(Command::Growth(args)) = cli.command else {
            panic!("expected growth");
        };
        assert_eq!(args.range, "1-3");
        assert_eq!(args.thresholds.thresholds(), Thresholds { min: Some(-500), max: Some(2000) });
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["dbtracker", "history", "5", "-s", "-C", "/etc/dbtracker.toml"]);
        assert!(cli.silent);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/dbtracker.toml")));
        assert!(matches!(cli.command, Some(Command::History(HistoryArgs { count: 5 }))));
    }

    #[test]
    fn dates_take_one_quoted_range() {
        let cli = parse(&["dbtracker", "dates", "2015-04-24 - 2015-04-22"]);
        assert!(matches!(cli.command, Some(Command::Dates(DatesArgs { ref range, .. })) if range == "2015-04-24 - 2015-04-22"));
    }

    #[test]
    fn history_needs_a_number() {
        assert!(Cli::try_parse_from(["dbtracker", "history", "many"]).is_err());
    }
}
