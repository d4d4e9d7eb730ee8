use clap::Parser;
use dbtracker::alert::{AlertSink, SendmailDispatcher};
use dbtracker::cli::{Cli, Command};
use dbtracker::config::Config;
use dbtracker::connector::{MysqlConnector, PostgresConnector};
use dbtracker::growth::{GrowthReport, Thresholds};
use dbtracker::report::{self, Console};
use dbtracker::store::SqliteStore;
use dbtracker::tracker::{self, Tracker};
use dbtracker::{Error, Result};
use env_logger::Env;

fn init_logging(silent: bool) {
    let level = if silent { "error" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
}

fn open_tracker(config: &Config) -> Result<Tracker<SqliteStore>> {
    let store = SqliteStore::open(&config.storage_path()?)?;
    Ok(Tracker::new(
        store,
        Box::new(MysqlConnector::new(config.mysql.clone())),
        Box::new(PostgresConnector::new(config.postgresql.clone())),
        config.report.group_by,
    ))
}

fn show_growth(report: &GrowthReport, json: bool, width: usize) -> Result<()> {
    if json {
        println!("{}", report::json::render(report)?);
        Ok(())
    } else {
        report::deliver_growth(report, width, &mut Console::stdout())
    }
}

fn alert(config: &Config, report: &GrowthReport, thresholds: Thresholds, width: usize) -> Result<()> {
    if !thresholds.is_configured() {
        return Ok(());
    }
    let dispatcher = SendmailDispatcher::new(config.alert.sendmail.clone());
    let mut sink = AlertSink::new(&dispatcher, &config.alert);
    tracker::alert_if_crossed(report, thresholds, width, &mut sink)?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        println!("Please pass -h for help");
        return Ok(());
    };

    let config = Config::load(cli.config.as_deref())?;
    let width = report::terminal_width(config.report.width);
    let mut tracker = open_tracker(&config)?;

    match command {
        Command::Save => {
            tracker.save(chrono::Local::now())?;
        }
        Command::History(args) => {
            for line in report::render_history(&tracker.history(args.count)?) {
                println!("{line}");
            }
        }
        Command::Growth(args) => {
            let report = tracker.growth(&args.range)?;
            show_growth(&report, args.json, width)?;
            alert(&config, &report, args.thresholds.thresholds(), width)?;
        }
        Command::Dates(args) => {
            let report = tracker.dates(&args.range)?;
            show_growth(&report, args.json, width)?;
            alert(&config, &report, args.thresholds.thresholds(), width)?;
        }
        Command::Count(args) => {
            let counts = tracker.count(chrono::Local::now())?;
            if args.json {
                println!("{}", report::json::render(&counts)?);
            } else {
                for line in report::render_counts(&counts, width, true) {
                    println!("{line}");
                }
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.silent);

    if let Err(e) = run(cli) {
        match e {
            Error::RangeParse(_) => log::warn!("{e}"),
            Error::Config(_) => log::error!("Invalid configuration: {e}"),
            _ => log::error!("{e}"),
        }
        std::process::exit(1);
    }
}
