//! alarmctl - command line front end for an alarm server.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use alarm_app::clock::parse_day;
use alarm_app::config::DEFAULT_API_URL;
use alarm_app::display::{AlarmForm, DELETE_CONFIRMATION, render_table};
use alarm_app::notify::ConsoleNotifier;
use alarm_app::{AlarmStore, ApiClient, MutationError};
use chrono::{Local, Timelike};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "alarmctl")]
#[command(version, about = "Manage alarms on an alarm server", long_about = None)]
struct Cli {
    /// Base URL of the alarm server
    #[arg(long, env = "ALARM_API_URL", default_value = DEFAULT_API_URL)]
    url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List alarms
    #[command(alias = "ls")]
    List,

    /// Add an alarm (defaults to the next full hour)
    Add {
        /// Time of day, HH:MM
        #[arg(long)]
        time: Option<String>,

        /// Weekdays, e.g. `mon,wed` or `1,3` (0 is Sunday); none means once
        #[arg(long, value_delimiter = ',', value_parser = day_arg)]
        days: Vec<u8>,

        /// Create the alarm switched off
        #[arg(long)]
        disabled: bool,
    },

    /// Change an alarm's time or days
    Edit {
        id: i64,

        /// Time of day, HH:MM
        #[arg(long)]
        time: Option<String>,

        /// Replace the weekdays
        #[arg(long, value_delimiter = ',', value_parser = day_arg)]
        days: Option<Vec<u8>>,

        /// Make the alarm one-shot
        #[arg(long, conflicts_with = "days")]
        once: bool,
    },

    /// Switch an alarm on
    Enable { id: i64 },

    /// Switch an alarm off
    Disable { id: i64 },

    /// Flip an alarm's on/off switch
    Toggle { id: i64 },

    /// Delete an alarm
    #[command(alias = "rm")]
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Silence the ringing alarm
    Stop,
}

fn day_arg(value: &str) -> Result<u8, String> {
    parse_day(value).ok_or_else(|| format!("unknown weekday {value:?}"))
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(cli.log_level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let store = AlarmStore::new(Arc::new(ApiClient::new(&cli.url)), Arc::new(ConsoleNotifier));

    let ok = match cli.command {
        Command::List => store.refresh().await.is_ok(),
        Command::Add {
            time,
            days,
            disabled,
        } => {
            let mut form = AlarmForm::for_new(Local::now().hour() as u8);
            if let Some(time) = time {
                form.set_time(time);
            }
            form.set_days(days);
            match form.to_draft(!disabled) {
                Ok(draft) => store.create(draft).await.is_ok(),
                Err(err) => return Ok(fail(err)),
            }
        }
        Command::Edit {
            id,
            time,
            days,
            once,
        } => {
            if store.ensure_loaded().await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
            let Some(alarm) = store.get(id).await else {
                return Ok(fail(MutationError::UnknownAlarm(id)));
            };
            let mut form = AlarmForm::for_alarm(&alarm);
            if let Some(time) = time {
                form.set_time(time);
            }
            if let Some(days) = days {
                form.set_days(days);
            }
            if once {
                form.set_days([]);
            }
            match form.apply_to(&alarm) {
                Ok(updated) => store.update(updated).await.is_ok(),
                Err(err) => return Ok(fail(err)),
            }
        }
        Command::Enable { id } => switch(&store, id, Some(true)).await,
        Command::Disable { id } => switch(&store, id, Some(false)).await,
        Command::Toggle { id } => switch(&store, id, None).await,
        Command::Delete { id, yes } => {
            if !yes && !confirm(DELETE_CONFIRMATION).await? {
                println!("Cancelled");
                return Ok(ExitCode::SUCCESS);
            }
            store.remove(id).await.is_ok()
        }
        Command::Stop => return Ok(exit_code(store.stop().await.is_ok())),
    };

    if let Some(alarms) = store.alarms().await {
        print!("{}", render_table(&alarms));
    }
    Ok(exit_code(ok))
}

async fn switch(store: &AlarmStore<ApiClient>, id: i64, enabled: Option<bool>) -> bool {
    if store.ensure_loaded().await.is_err() {
        return false;
    }
    let result = match enabled {
        Some(enabled) => store.set_enabled(id, enabled).await,
        None => store.toggle(id).await.map(drop),
    };
    match result {
        Ok(()) => true,
        Err(err @ MutationError::UnknownAlarm(_)) => {
            eprintln!("error: {err}");
            false
        }
        // Already reported by the store.
        Err(MutationError::Api(_)) => false,
    }
}

async fn confirm(prompt: &str) -> std::io::Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

fn fail(err: impl std::fmt::Display) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::FAILURE
}

fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
