use std::collections::BTreeMap;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use taskboard_core::config::{Config, Palette};
use taskboard_core::error::AppError;
use taskboard_core::model::Task;
use taskboard_core::store::StoreSnapshot;
use taskboard_core::views::due_day;
use time::Date;
use time::macros::format_description;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Important")]
    important: &'static str,
    #[tabled(rename = "Done")]
    done: &'static str,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Due")]
    due: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        let minute_format = format_description!("[year]-[month]-[day] [hour]:[minute]");
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            priority: task.priority.to_string(),
            important: if task.is_important { "★" } else { "" },
            done: if task.completed { "✓" } else { "" },
            created: task
                .created_at
                .format(minute_format)
                .unwrap_or_else(|_| task.created_at.to_string()),
            due: due_day(task)
                .map(|due| due.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub fn task_table(tasks: &[Task]) -> String {
    let rows: Vec<TaskRow> = tasks.iter().map(TaskRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn print_tasks(tasks: &[Task], palette: &Palette, json: bool) -> Result<(), AppError> {
    if json {
        return print_json(&tasks);
    }

    if tasks.is_empty() {
        println!("{}", palette.mutedize("No tasks."));
    } else {
        println!("{}", task_table(tasks));
    }
    Ok(())
}

pub fn print_task(verb: &str, task: &Task, palette: &Palette, json: bool) -> Result<(), AppError> {
    if json {
        return print_json(task);
    }

    println!(
        "{} {} ({})",
        palette.accentize(&format!("{verb} task:")),
        task.title,
        task.id
    );
    Ok(())
}

pub fn print_calendar(
    days: &BTreeMap<Date, Vec<Task>>,
    heading: &str,
    palette: &Palette,
    json: bool,
) -> Result<(), AppError> {
    if json {
        let payload: BTreeMap<String, &Vec<Task>> = days
            .iter()
            .map(|(day, tasks)| (day.to_string(), tasks))
            .collect();
        return print_json(&payload);
    }

    println!("{}", palette.accentize(heading));
    if days.is_empty() {
        println!("{}", palette.mutedize("No tasks."));
        return Ok(());
    }

    for (day, tasks) in days {
        println!("{day}");
        for task in tasks {
            let star = if task.is_important { " ★" } else { "" };
            let done = if task.completed { " ✓" } else { "" };
            println!(
                "  [{}] {}{}{} ({})",
                task.priority, task.title, star, done, task.id
            );
        }
    }
    Ok(())
}

pub fn print_status(snapshot: &StoreSnapshot, palette: &Palette, json: bool) -> Result<(), AppError> {
    if json {
        return print_json(&serde_json::json!({
            "tasks": snapshot.tasks.len(),
            "loading": snapshot.loading,
            "error": snapshot.error,
        }));
    }

    println!("{} {}", palette.accentize("Tasks:"), snapshot.tasks.len());
    println!("{} {}", palette.accentize("Loading:"), snapshot.loading);
    println!(
        "{} {}",
        palette.accentize("Error:"),
        snapshot.error.as_deref().unwrap_or("-")
    );
    Ok(())
}

pub fn print_settings(config: &Config, palette: &Palette, json: bool) -> Result<(), AppError> {
    if json {
        return print_json(config);
    }

    let theme = config.theme.as_deref().unwrap_or("default");
    println!("{} {}", palette.accentize("theme:"), theme);
    println!(
        "{} {}",
        palette.accentize("notifications:"),
        config.notifications
    );
    println!("{} {}", palette.accentize("auto_archive:"), config.auto_archive);
    println!(
        "{} {}",
        palette.accentize("refresh_delay_ms:"),
        config.refresh_delay_ms
    );
    println!("{} {:?}", palette.accentize("ids:"), config.ids);
    Ok(())
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let rendered =
        serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}
