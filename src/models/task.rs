use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use crate::error::AppError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started. New tasks default to this.
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(()),
        }
    }
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i32,
    /// Owner. Every task query is scoped by it.
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task.
///
/// `status` and `due_date` stay as text until validated so a bad value is
/// reported with a readable message rather than a deserialization error.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,

    #[validate(custom = "validate_status_value")]
    pub status: Option<String>,

    #[validate(custom = "validate_due_date")]
    pub due_date: Option<String>,
}

/// A validated [`CreateTaskRequest`], ready to insert.
#[derive(Debug, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    pub fn into_new_task(self) -> Result<NewTask, AppError> {
        self.validate().map_err(|errors| {
            AppError::from_validation_ordered(
                errors,
                &["title", "description", "status", "due_date"],
            )
        })?;

        let status = match self.status.as_deref() {
            Some(raw) => parse_status(raw, "Invalid status value")?,
            None => TaskStatus::default(),
        };
        let due_date = match self.due_date.as_deref() {
            Some(raw) => Some(
                parse_due_date(raw).ok_or_else(|| AppError::Validation("Invalid due date".into()))?,
            ),
            None => None,
        };

        Ok(NewTask {
            title: self.title,
            description: self.description,
            status,
            due_date,
        })
    }
}

/// Body of a status change.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

impl StatusUpdate {
    pub fn status(&self) -> Result<TaskStatus, AppError> {
        match self.status.as_deref() {
            None | Some("") => Err(AppError::Validation("Status is required".into())),
            Some(raw) => parse_status(raw, "Invalid status filter"),
        }
    }
}

/// Query string of the task listing. Everything arrives as text and is checked by
/// [`TaskListQuery::parse`].
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
}

/// A validated listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFilter {
    pub page: i64,
    pub limit: i64,
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    /// Rows to skip. Saturates, so a page far past the end just comes back empty.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl TaskListQuery {
    pub fn parse(&self) -> Result<TaskFilter, AppError> {
        let page = parse_positive(self.page.as_deref(), DEFAULT_PAGE)?;
        let limit = parse_positive(self.limit.as_deref(), DEFAULT_LIMIT)?;
        let status = match self.status.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(parse_status(raw, "Invalid status filter")?),
        };

        Ok(TaskFilter {
            page,
            limit,
            status,
        })
    }
}

/// One page of the caller's tasks.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPage {
    pub total_pages: i64,
    pub current_page: i64,
    pub tasks: Vec<Task>,
    pub total_tasks: i64,
}

impl TaskPage {
    pub fn new(filter: TaskFilter, tasks: Vec<Task>, total_tasks: i64) -> Self {
        Self {
            total_pages: total_tasks / filter.limit + i64::from(total_tasks % filter.limit != 0),
            current_page: filter.page,
            tasks,
            total_tasks,
        }
    }
}

fn parse_status(raw: &str, message: &str) -> Result<TaskStatus, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation(message.to_string()))
}

fn parse_positive(raw: Option<&str>, default: i64) -> Result<i64, AppError> {
    let value = match raw {
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::Validation("Page and limit must be integers".into()))?,
        None => default,
    };
    if value <= 0 {
        return Err(AppError::Validation(
            "Page and limit must be positive integers".into(),
        ));
    }
    Ok(value)
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn validate_status_value(status: &str) -> Result<(), ValidationError> {
    status
        .parse::<TaskStatus>()
        .map(|_| ())
        .map_err(|_| validation_error("status", "Invalid status value"))
}

fn validate_due_date(raw: &str) -> Result<(), ValidationError> {
    match parse_due_date(raw) {
        None => Err(validation_error("due_date", "Invalid due date")),
        Some(due) if due <= Utc::now() => Err(validation_error(
            "due_date",
            "Due date must be a future date",
        )),
        Some(_) => Ok(()),
    }
}
