//! taskpad task command implementations.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::query::StatusFilter;
use crate::service::TaskService;
use crate::stats::TaskStats;
use crate::storage::{FileStore, Storage};
use crate::task::{category_label, find_category, Category, NewTask, Priority, Task, TaskPatch};

/// Characters of the id shown in human output.
const SHORT_ID_LEN: usize = 8;

/// Flags shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub data_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl GlobalOptions {
    fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }
}

pub struct AddOptions {
    pub title: String,
    pub description: Option<String>,
    pub due: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub global: GlobalOptions,
}

pub struct ListOptions {
    pub search: Option<String>,
    pub status: String,
    pub limit: Option<usize>,
    pub global: GlobalOptions,
}

pub struct ShowOptions {
    pub id: String,
    pub global: GlobalOptions,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub completed: Option<bool>,
    pub global: GlobalOptions,
}

pub struct ToggleOptions {
    pub id: String,
    pub global: GlobalOptions,
}

pub struct DeleteOptions {
    pub id: String,
    pub global: GlobalOptions,
}

pub struct StatsOptions {
    pub global: GlobalOptions,
}

pub struct CategoriesOptions {
    pub global: GlobalOptions,
}

struct TaskContext {
    runtime: Runtime,
    service: TaskService<FileStore>,
    config: Config,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let mut ctx = load_context(&options.global)?;
    let title = normalize_title(&options.title)?;
    let due_date = match options.due.as_deref() {
        Some(value) => parse_due(value)?,
        None => Utc::now(),
    };
    let priority = match options.priority.as_deref() {
        Some(value) => value.parse::<Priority>()?,
        None => ctx.config.tasks.priority()?,
    };
    let category = options
        .category
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| ctx.config.tasks.category(ctx.service.categories()));

    let mut fields = NewTask::new(title, due_date);
    fields.description = options
        .description
        .map(|value| value.trim().to_string())
        .unwrap_or_default();
    fields.priority = priority;
    fields.category = category;

    let task = ctx.runtime.block_on(ctx.service.create_task(fields))?;
    let output = TaskView::new(&task, ctx.service.categories(), Utc::now());

    let mut human = HumanOutput::new("Task created");
    push_unknown_category_warning(&mut human, &output);
    push_task_summary(&mut human, &output);
    human.push_next_step(format!("taskpad toggle {}", short_id(&task.id)));

    emit_success(options.global.output(), "add", &output, &human)
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(&options.global)?;
    let status: StatusFilter = options.status.parse()?;
    let search = options.search.unwrap_or_default();
    let now = Utc::now();

    let mut tasks = ctx.service.filter_and_sort_at(&search, status, now);
    let matched = tasks.len();
    apply_limit(&mut tasks, options.limit)?;

    let views: Vec<TaskView> = tasks
        .iter()
        .map(|task| TaskView::new(task, ctx.service.categories(), now))
        .collect();
    let output = TaskListOutput {
        total: ctx.service.tasks().len(),
        matched,
        status,
        search: (!search.trim().is_empty()).then(|| search.clone()),
        tasks: views,
    };

    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Total", output.total.to_string());
    human.push_summary("Matched", matched.to_string());
    if status != StatusFilter::All {
        human.push_summary("Status", status.to_string());
    }
    if let Some(search) = output.search.as_ref() {
        human.push_summary("Search", search.clone());
    }
    if output.tasks.len() < matched {
        human.push_summary("Shown", output.tasks.len().to_string());
    }
    for view in &output.tasks {
        human.push_detail(format_task_line(view));
    }
    if output.total == 0 {
        human.push_next_step("taskpad add \"<title>\"");
    }

    emit_success(options.global.output(), "list", &output, &human)
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let ctx = load_context(&options.global)?;
    let id = resolve_task_id(&ctx.service, &options.id)?;
    let task = ctx
        .service
        .task(&id)
        .ok_or_else(|| Error::TaskNotFound(options.id.clone()))?;
    let output = TaskView::new(task, ctx.service.categories(), Utc::now());

    let mut human = HumanOutput::new(format!("Task {}", output.task.id));
    push_task_summary(&mut human, &output);
    if !output.task.description.is_empty() {
        human.push_detail(output.task.description.clone());
    }

    emit_success(options.global.output(), "show", &output, &human)
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let mut ctx = load_context(&options.global)?;
    let id = resolve_task_id(&ctx.service, &options.id)?;

    let patch = TaskPatch {
        title: options.title.as_deref().map(normalize_title).transpose()?,
        description: options.description.map(|value| value.trim().to_string()),
        due_date: options.due.as_deref().map(parse_due).transpose()?,
        priority: options
            .priority
            .as_deref()
            .map(str::parse::<Priority>)
            .transpose()?,
        category: options.category.map(|value| value.trim().to_string()),
        completed: options.completed,
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "edit requires at least one of --title, --description, --due, --priority, --category, --completed"
                .to_string(),
        ));
    }

    let task = ctx
        .runtime
        .block_on(ctx.service.update_task(&id, patch))?
        .ok_or_else(|| Error::TaskNotFound(options.id.clone()))?;
    let output = TaskView::new(&task, ctx.service.categories(), Utc::now());

    let mut human = HumanOutput::new("Task updated");
    push_unknown_category_warning(&mut human, &output);
    push_task_summary(&mut human, &output);

    emit_success(options.global.output(), "edit", &output, &human)
}

pub fn run_toggle(options: ToggleOptions) -> Result<()> {
    let mut ctx = load_context(&options.global)?;
    let id = resolve_task_id(&ctx.service, &options.id)?;

    let task = ctx
        .runtime
        .block_on(ctx.service.toggle_complete(&id))?
        .ok_or_else(|| Error::TaskNotFound(options.id.clone()))?;
    let output = TaskView::new(&task, ctx.service.categories(), Utc::now());

    let header = if task.completed {
        "Task completed"
    } else {
        "Task reopened"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title.clone());

    emit_success(options.global.output(), "toggle", &output, &human)
}

pub fn run_delete(options: DeleteOptions) -> Result<()> {
    let mut ctx = load_context(&options.global)?;
    let id = resolve_task_id(&ctx.service, &options.id)?;

    if !ctx.runtime.block_on(ctx.service.delete_task(&id))? {
        return Err(Error::TaskNotFound(options.id));
    }

    let output = TaskDeleteOutput { id: id.clone() };
    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("ID", id);

    emit_success(options.global.output(), "rm", &output, &human)
}

pub fn run_stats(options: StatsOptions) -> Result<()> {
    let ctx = load_context(&options.global)?;
    let stats = ctx.service.statistics();

    let mut human = HumanOutput::new("Task stats");
    push_stats_summary(&mut human, &stats);

    emit_success(options.global.output(), "stats", &stats, &human)
}

pub fn run_categories(options: CategoriesOptions) -> Result<()> {
    let ctx = load_context(&options.global)?;
    let output = CategoriesOutput {
        categories: ctx.service.categories().to_vec(),
    };

    let mut human = HumanOutput::new("Categories");
    human.push_summary("Total", output.categories.len().to_string());
    for category in &output.categories {
        human.push_detail(format!(
            "[{}] {} ({}, {})",
            category.id, category.name, category.color, category.icon
        ));
    }

    emit_success(options.global.output(), "categories", &output, &human)
}

fn load_context(global: &GlobalOptions) -> Result<TaskContext> {
    let config = Config::resolve(global.config.as_deref())?;
    let data_dir = config.resolve_data_dir(global.data_dir.as_deref())?;
    let store = FileStore::open(&data_dir, config.storage.lock_timeout_ms)?;
    tracing::debug!(data_dir = %data_dir.display(), "opened data directory");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let service = runtime.block_on(TaskService::open(Storage::new(store)));

    Ok(TaskContext {
        runtime,
        service,
        config,
    })
}

/// Exact id, or a prefix matching exactly one task.
fn resolve_task_id(service: &TaskService<FileStore>, input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
    }
    if service.task(input).is_some() {
        return Ok(input.to_string());
    }

    let matches: Vec<&Task> = service
        .tasks()
        .iter()
        .filter(|task| task.id.starts_with(input))
        .collect();
    match matches.as_slice() {
        [task] => Ok(task.id.clone()),
        [] => Err(Error::TaskNotFound(input.to_string())),
        _ => Err(Error::InvalidArgument(format!(
            "task id '{input}' is ambiguous ({} matches)",
            matches.len()
        ))),
    }
}

fn normalize_title(value: &str) -> Result<String> {
    let title = value.trim();
    if title.is_empty() {
        return Err(Error::InvalidArgument("title cannot be empty".to_string()));
    }
    Ok(title.to_string())
}

/// RFC 3339 timestamp, or `YYYY-MM-DD` meaning the last second of that day in UTC.
fn parse_due(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        Error::InvalidArgument(format!(
            "invalid due date '{value}' (expected YYYY-MM-DD or RFC 3339)"
        ))
    })?;
    let end_of_day = date
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| Error::InvalidArgument(format!("invalid due date '{value}'")))?;
    Ok(Utc.from_utc_datetime(&end_of_day))
}

fn apply_limit(tasks: &mut Vec<Task>, limit: Option<usize>) -> Result<()> {
    if let Some(limit) = limit {
        if limit == 0 {
            return Err(Error::InvalidArgument("limit must be >= 1".to_string()));
        }
        tasks.truncate(limit);
    }
    Ok(())
}

fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

fn format_task_line(view: &TaskView) -> String {
    let task = &view.task;
    let mark = if task.completed { "x" } else { " " };
    let mut line = format!(
        "[{mark}] [{}] {} {} (due {}, {})",
        task.priority,
        short_id(&task.id),
        task.title,
        task.due_date.format("%Y-%m-%d %H:%M"),
        view.category_name
    );
    if view.overdue {
        line.push_str(" OVERDUE");
    }
    line
}

fn push_task_summary(human: &mut HumanOutput, view: &TaskView) {
    let task = &view.task;
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title.clone());
    human.push_summary("Priority", task.priority.to_string());
    human.push_summary("Category", view.category_name.clone());
    let mut due = task.due_date.to_rfc3339();
    if view.overdue {
        due.push_str(" (overdue)");
    }
    human.push_summary("Due", due);
    human.push_summary(
        "Status",
        if task.completed { "completed" } else { "pending" },
    );
    human.push_summary("Created", task.created_at.to_rfc3339());
    human.push_summary("Updated", task.updated_at.to_rfc3339());
}

fn push_unknown_category_warning(human: &mut HumanOutput, view: &TaskView) {
    if !view.category_known {
        human.push_warning(format!(
            "unknown category '{}'; task is shown as uncategorized",
            view.task.category
        ));
    }
}

fn push_stats_summary(human: &mut HumanOutput, stats: &TaskStats) {
    human.push_summary("Total", stats.total.to_string());
    human.push_summary("Completed", stats.completed.to_string());
    human.push_summary("Pending", stats.pending.to_string());
    human.push_summary("Overdue", stats.overdue.to_string());
    human.push_summary("Completion rate", format!("{:.1}%", stats.completion_rate));
    human.push_summary("Created this week", stats.this_week.to_string());
    human.push_summary(
        "By priority",
        Priority::ALL
            .iter()
            .map(|priority| format!("{priority} {}", stats.by_priority.get(*priority)))
            .collect::<Vec<_>>()
            .join(", "),
    );
    if let Some(leader) = stats.most_active_category.as_ref() {
        human.push_summary("Most active", format!("{} ({})", leader.name, leader.count));
    }
    for entry in &stats.by_category {
        human.push_detail(format!(
            "{}: {} tasks, {} done ({:.1}%)",
            entry.name, entry.count, entry.completed, entry.completion_rate
        ));
    }
    if stats.uncategorized > 0 {
        human.push_detail(format!("uncategorized: {} tasks", stats.uncategorized));
    }
}

/// A task plus the display fields derived from the category list and clock.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskView {
    #[serde(flatten)]
    task: Task,
    category_name: String,
    #[serde(skip)]
    category_known: bool,
    overdue: bool,
}

impl TaskView {
    fn new(task: &Task, categories: &[Category], now: DateTime<Utc>) -> Self {
        let category_name = category_label(categories, &task.category).to_string();
        Self {
            category_known: find_category(categories, &task.category).is_some(),
            category_name,
            overdue: task.is_overdue(now),
            task: task.clone(),
        }
    }
}

#[derive(Serialize)]
struct TaskListOutput {
    total: usize,
    matched: usize,
    status: StatusFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<String>,
    tasks: Vec<TaskView>,
}

#[derive(Serialize)]
struct TaskDeleteOutput {
    id: String,
}

#[derive(Serialize)]
struct CategoriesOutput {
    categories: Vec<Category>,
}
