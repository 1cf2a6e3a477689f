use clap::{Parser, Subcommand};
use taskboard_core::error::AppError;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, Time};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE). In the interactive
    /// shell `refresh_delay_ms` and `ids` are rejected, since the store is
    /// already built from the config file.
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: add "Buy milk" -d "2%" --priority high --important
    Add {
        title: Option<String>,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value = "low")]
        priority: String,
        #[arg(short, long)]
        important: bool,
        /// Due date, YYYY-MM-DD or RFC3339
        #[arg(long)]
        due: Option<String>,
    },
    /// Delete a task
    ///
    /// Example: delete task-1
    Delete { id: String },
    /// Toggle a task's completed flag
    ///
    /// Example: done task-1
    Done { id: String },
    /// Toggle a task's important flag
    ///
    /// Example: star task-1
    Star { id: String },
    /// Change a task's priority
    ///
    /// Example: priority task-1 high
    Priority { id: String, priority: String },
    /// Set or clear a task's due date
    ///
    /// Example: due task-1 2025-12-24
    /// Example: due task-1 (clears the due date)
    Due { id: String, date: Option<String> },
    /// List tasks
    ///
    /// Example: list --sort title
    List {
        /// date, title or completed
        #[arg(long, default_value = "date")]
        sort: String,
    },
    /// Show tasks by calendar day
    ///
    /// Example: calendar 2025-12
    /// Example: calendar --day 2025-12-24
    Calendar {
        /// Month as YYYY-MM (defaults to the current month)
        month: Option<String>,
        #[arg(long, conflicts_with = "month")]
        day: Option<String>,
    },
    /// Show pending tasks ordered by priority
    ///
    /// Example: notifications --priority high --important-only
    /// Example: notifications --send
    Notifications {
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        important_only: bool,
        /// Also push the entries as desktop notifications
        #[arg(long)]
        send: bool,
    },
    /// Reload the task list
    ///
    /// Example: refresh
    /// Example: refresh --background
    Refresh {
        /// Cancel in-flight refreshes first
        #[arg(long)]
        supersede: bool,
        /// Return immediately instead of waiting for the reload
        #[arg(long)]
        background: bool,
    },
    /// Cancel in-flight refreshes
    Cancel,
    /// Show loading state, error and task count
    Status,
    /// Remove all completed tasks
    Archive,
    /// Show effective settings
    Settings,
}

/// Accepts `YYYY-MM-DD` (midnight UTC) or a full RFC3339 timestamp.
pub fn parse_due_date(raw: &str) -> Result<OffsetDateTime, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("date is required"));
    }

    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(parsed);
    }

    parse_day(trimmed).map(|day| day.with_time(Time::MIDNIGHT).assume_utc())
}

pub fn parse_day(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_input("date must be YYYY-MM-DD or RFC3339"))
}

pub fn parse_month(raw: &str) -> Result<(i32, Month), AppError> {
    let invalid = || AppError::invalid_input("month must be YYYY-MM");
    let (year_raw, month_raw) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year = year_raw.parse::<i32>().map_err(|_| invalid())?;
    let month_number = month_raw.parse::<u8>().map_err(|_| invalid())?;
    let month = Month::try_from(month_number).map_err(|_| invalid())?;
    Ok((year, month))
}
