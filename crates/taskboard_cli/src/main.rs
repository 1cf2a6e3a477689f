use clap::{CommandFactory, Parser};
use std::collections::BTreeMap;
use std::io::{self, BufRead};
use taskboard_cli::cli::{Cli, Command, parse_day, parse_due_date, parse_month};
use taskboard_cli::render;
use taskboard_core::config::{
    Config, ConfigOverrides, IdStyle, load_config_with_fallback, merge_overrides, palette_for_theme,
};
use taskboard_core::error::AppError;
use taskboard_core::logging;
use taskboard_core::model::{NewTask, Priority, Task};
use taskboard_core::notify::{deliver_notifications, notifier_from_env};
use taskboard_core::store::{RandomIds, SequentialIds, TaskStore};
use taskboard_core::views::{
    NotificationFilter, SortKey, calendar_month, notification_feed, sort_tasks, tasks_on,
};
use time::OffsetDateTime;

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;
    let mut quoted_token = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            quoted_token = true;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() || quoted_token {
                args.push(std::mem::take(&mut current));
                quoted_token = false;
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() || quoted_token {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn effective_config(base: &Config, overrides: &[String]) -> Result<Config, AppError> {
    let overrides = ConfigOverrides::from_pairs(overrides)?;
    Ok(merge_overrides(base, &overrides))
}

fn reject_store_overrides(raw: &[String]) -> Result<(), AppError> {
    if ConfigOverrides::from_pairs(raw)?.affects_store() {
        return Err(AppError::invalid_input(
            "refresh_delay_ms and ids cannot be overridden inside the shell; set them in the config file",
        ));
    }
    Ok(())
}

fn build_store(config: &Config) -> TaskStore {
    let builder = TaskStore::builder().refresh_delay(config.refresh_delay());
    match config.ids {
        IdStyle::Random => builder.ids(RandomIds).build(),
        IdStyle::Sequential => builder.ids(SequentialIds::default()).build(),
    }
}

fn require_title(title: Option<String>) -> Result<String, AppError> {
    match title {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(AppError::invalid_input("title is required")),
    }
}

fn parse_priority_filter(raw: Option<&str>) -> Result<Option<Priority>, AppError> {
    match raw.map(str::trim) {
        None | Some("all") => Ok(None),
        Some(value) => value.parse::<Priority>().map(Some),
    }
}

async fn run_command(store: &TaskStore, base: &Config, cli: Cli) -> Result<(), AppError> {
    let config = effective_config(base, &cli.config_override)?;
    let palette = palette_for_theme(config.theme.as_deref());
    let json = cli.json;

    match cli.command {
        Command::Add {
            title,
            description,
            priority,
            important,
            due,
        } => {
            let title = require_title(title)?;
            let priority = priority.parse::<Priority>()?;
            let due_date = due.as_deref().map(parse_due_date).transpose()?;

            let task = store.create(
                NewTask::new(title, description)
                    .with_priority(priority)
                    .important(important)
                    .due(due_date),
            );
            render::print_task("Added", &task, &palette, json)?;
        }
        Command::Delete { id } => {
            let id = id.trim();
            let task = store
                .delete(id)
                .ok_or_else(|| AppError::task_not_found(id))?;
            render::print_task("Deleted", &task, &palette, json)?;
        }
        Command::Done { id } => {
            let id = id.trim();
            let task = store
                .toggle_completed(id)
                .ok_or_else(|| AppError::task_not_found(id))?;
            let verb = if task.completed { "Completed" } else { "Reopened" };
            render::print_task(verb, &task, &palette, json)?;

            if task.completed && config.auto_archive {
                let archived = store.archive_completed();
                if !json {
                    println!("Archived {} completed tasks", archived.len());
                }
            }
        }
        Command::Star { id } => {
            let id = id.trim();
            let task = store
                .toggle_important(id)
                .ok_or_else(|| AppError::task_not_found(id))?;
            let verb = if task.is_important { "Starred" } else { "Unstarred" };
            render::print_task(verb, &task, &palette, json)?;
        }
        Command::Priority { id, priority } => {
            let priority = priority.parse::<Priority>()?;
            let id = id.trim();
            let task = store
                .set_priority(id, priority)
                .ok_or_else(|| AppError::task_not_found(id))?;
            render::print_task("Updated", &task, &palette, json)?;
        }
        Command::Due { id, date } => {
            let due_date = date.as_deref().map(parse_due_date).transpose()?;
            let id = id.trim();
            let task = store
                .update_due_date(id, due_date)
                .ok_or_else(|| AppError::task_not_found(id))?;
            render::print_task("Updated", &task, &palette, json)?;
        }
        Command::List { sort } => {
            let key = sort.parse::<SortKey>()?;
            let tasks = sort_tasks(&store.tasks(), key);
            render::print_tasks(&tasks, &palette, json)?;
        }
        Command::Calendar { month, day } => {
            let tasks = store.tasks();
            if let Some(day) = day {
                let day = parse_day(&day)?;
                let on_day = tasks_on(&tasks, day);
                let mut days = BTreeMap::new();
                if !on_day.is_empty() {
                    days.insert(day, on_day);
                }
                render::print_calendar(&days, &format!("Tasks on {day}"), &palette, json)?;
            } else {
                let (year, month) = match month {
                    Some(raw) => parse_month(&raw)?,
                    None => {
                        let today = OffsetDateTime::now_utc().date();
                        (today.year(), today.month())
                    }
                };
                let days = calendar_month(&tasks, year, month);
                let heading = format!("Calendar for {} {}", month, year);
                render::print_calendar(&days, &heading, &palette, json)?;
            }
        }
        Command::Notifications {
            priority,
            important_only,
            send,
        } => {
            let filter = NotificationFilter {
                priority: parse_priority_filter(priority.as_deref())?,
                important_only,
            };
            let tasks = store.tasks();

            if send {
                if !config.notifications {
                    return Err(AppError::invalid_input(
                        "notifications are disabled in settings",
                    ));
                }
                let notifier = notifier_from_env()?;
                let outcome = deliver_notifications(&tasks, &filter, notifier.as_ref());
                for failure in &outcome.failures {
                    eprintln!("ERROR: {} ({})", failure.error, failure.task_id);
                }
                render::print_tasks(&outcome.tasks, &palette, json)?;
            } else {
                render::print_tasks(&notification_feed(&tasks, &filter), &palette, json)?;
            }
        }
        Command::Refresh {
            supersede,
            background,
        } => {
            let handle = if supersede {
                store.refresh_superseding()
            } else {
                store.refresh()
            };

            if background {
                if !json {
                    println!("Refresh started");
                }
            } else {
                handle.wait().await;
                if let Some(error) = store.error() {
                    eprintln!("WARNING: refresh failed: {error}");
                }
                if json {
                    render::print_json(&store.tasks())?;
                } else {
                    println!("Refreshed: {} tasks", store.len());
                }
            }
        }
        Command::Cancel => {
            let cancelled = store.cancel_refresh();
            if json {
                render::print_json(&serde_json::json!({ "cancelled": cancelled }))?;
            } else {
                println!("Cancelled {cancelled} refreshes");
            }
        }
        Command::Status => {
            render::print_status(&store.snapshot(), &palette, json)?;
        }
        Command::Archive => {
            let archived: Vec<Task> = store.archive_completed();
            if json {
                render::print_json(&archived)?;
            } else {
                println!("Archived {} completed tasks", archived.len());
            }
        }
        Command::Settings => {
            render::print_settings(&config, &palette, json)?;
        }
    }

    Ok(())
}

async fn run_interactive(base: &Config) -> Result<(), AppError> {
    let store = build_store(base);
    store.refresh().wait().await;
    if let Some(error) = store.error() {
        eprintln!("WARNING: initial refresh failed: {error}");
    }

    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("taskboard".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) if !err.use_stderr() => {
                let _ = err.print();
                continue;
            }
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = reject_store_overrides(&cli.config_override) {
            eprintln!("ERROR: {}", err);
            continue;
        }

        if let Err(err) = run_command(&store, base, cli).await {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    logging::init_logging();

    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        eprintln!("WARNING: using default settings: {}", err);
    }
    let base = loaded.config;

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive(&base).await {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let store = match effective_config(&base, &cli.config_override) {
        Ok(config) => build_store(&config),
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(&store, &base, cli).await {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
