use std::io;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;

mod config;
mod console;
mod datetime;
mod error;
mod report_command;
mod time_entry;
mod toggl;
mod users_command;

use config::Config;
use console::{ConsolePresenter, ConsoleText};
use report_command::ReportCommand;
use toggl::{ReportQuery, TogglClient};
use users_command::UsersCommand;

/// Togglのtime entryからレポートを作成するCLIアプリケーション。
///
/// # Examples
/// ```
/// $ cargo run -- --report -t work -t personal -s 7
/// $ cargo run -- --list-users
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(
        short = 'u',
        long = "user",
        help = "Filter the report to the given user id (repeatable)"
    )]
    user: Vec<i64>,

    #[clap(long = "list-users", help = "List the users of the workspace")]
    list_users: bool,

    #[clap(long = "report", help = "Show the time spent per tag")]
    report: bool,

    #[clap(
        short = 't',
        long = "tag",
        help = "Tag to break out in the report (repeatable)"
    )]
    tag: Vec<String>,

    #[clap(
        short = 's',
        long = "span",
        help = "Number of days to look back from today. Defaults to today only"
    )]
    span: Option<i64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logger().context("Failed to initialize logger")?;

    let config = Config::load().context("Failed to load configuration")?;
    let client = TogglClient::new(&config);

    let query = ReportQuery {
        since: since_date(args.span),
        user_ids: args.user,
        tags: args.tag,
    };

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut presenter = ConsoleText::new(&mut writer);

    if args.report {
        let report = ReportCommand::new(&client)
            .run(&query)
            .context("Failed to create the tag report")?;
        presenter
            .show_tag_report(&report)
            .context("Failed to show the tag report")?;
    }

    if args.list_users {
        let users = UsersCommand::new(&client)
            .run()
            .context("Failed to list workspace users")?;
        presenter
            .show_users(&users)
            .context("Failed to show workspace users")?;
    }

    Ok(())
}

/// レポートの開始日を計算する。
///
/// spanが指定された場合は今日からspan日前、指定されていない場合は今日を開始日とする。
fn since_date(span: Option<i64>) -> NaiveDate {
    match span {
        Some(days) => datetime::today() - chrono::Duration::days(days),
        None => datetime::today(),
    }
}

/// stderrへのロガーを初期化する。
///
/// レポート本文はstdoutへ出力するため、ログはstderrのみに出す。
fn setup_logger() -> Result<(), fern::InitError> {
    let colors = fern::colors::ColoredLevelConfig::new();

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                colors.color(record.level()),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(io::stderr())
        .apply()?;

    Ok(())
}
