use crate::{
    auth::AuthenticatedIdentity,
    error::AppError,
    models::{CreateTaskRequest, StatusUpdate, Task, TaskListQuery, TaskPage},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;

const TASK_COLUMNS: &str =
    "id, user_id, title, description, status, due_date, created_at, updated_at";

const TASK_NOT_FOUND: &str = "The task is not found";

/// Creates a new task owned by the caller.
///
/// ## Request Body:
/// - `title` (required)
/// - `description` (optional, at most 500 characters)
/// - `status` (optional): `pending` (default), `in_progress` or `completed`.
/// - `due_date` (optional): RFC 3339 or `YYYY-MM-DD`, must lie in the future.
///
/// ## Responses:
/// - `201 Created`: `{message, data: Task}`.
/// - `400 Bad Request`: with a `message` naming the first problem found.
#[post("/create")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    identity: AuthenticatedIdentity,
    task_data: web::Json<CreateTaskRequest>,
) -> Result<impl Responder, AppError> {
    let new_task = task_data.into_inner().into_new_task()?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (user_id, title, description, status, due_date) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {TASK_COLUMNS}"
    ))
    .bind(identity.subject_id)
    .bind(new_task.title)
    .bind(new_task.description)
    .bind(new_task.status)
    .bind(new_task.due_date)
    .fetch_one(&**pool)
    .await?;

    log::debug!("user {} created task {}", identity.subject_id, task.id);

    Ok(HttpResponse::Created().json(json!({
        "message": "Task created successfully",
        "data": task,
    })))
}

/// Lists the caller's tasks, newest first, one page at a time.
///
/// ## Query Parameters:
/// - `page` (default 1) and `limit` (default 10): positive integers.
/// - `status` (optional): only tasks with this status.
///
/// ## Responses:
/// - `200 OK`: `{message, data: {totalPages, currentPage, tasks, totalTasks}}`.
/// - `400 Bad Request`: bad paging values or unknown status.
/// - `404 Not Found`: the requested page is empty.
#[get("/getAllTasks")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    identity: AuthenticatedIdentity,
    query_params: web::Query<TaskListQuery>,
) -> Result<impl Responder, AppError> {
    let filter = query_params.parse()?;

    let (total_tasks,) = sqlx::query_as::<_, (i64,)>(
        "SELECT COUNT(*) FROM tasks \
         WHERE user_id = $1 AND ($2::task_status IS NULL OR status = $2)",
    )
    .bind(identity.subject_id)
    .bind(filter.status)
    .fetch_one(&**pool)
    .await?;

    let tasks = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks \
         WHERE user_id = $1 AND ($2::task_status IS NULL OR status = $2) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $3 OFFSET $4"
    ))
    .bind(identity.subject_id)
    .bind(filter.status)
    .bind(filter.limit)
    .bind(filter.offset())
    .fetch_all(&**pool)
    .await?;

    if tasks.is_empty() {
        return Err(AppError::NotFound("No tasks found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Tasks retrieved successfully",
        "data": TaskPage::new(filter, tasks, total_tasks),
    })))
}

/// Changes the status of one of the caller's tasks.
///
/// Tasks owned by someone else are reported as missing.
#[put("/updateStatus/{id}")]
pub async fn update_task_status(
    pool: web::Data<PgPool>,
    identity: AuthenticatedIdentity,
    task_id: web::Path<i32>,
    body: web::Json<StatusUpdate>,
) -> Result<impl Responder, AppError> {
    let status = body.status()?;

    let result = sqlx::query(
        "UPDATE tasks SET status = $1, updated_at = NOW() WHERE id = $2 AND user_id = $3",
    )
    .bind(status)
    .bind(task_id.into_inner())
    .bind(identity.subject_id)
    .execute(&**pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(TASK_NOT_FOUND.into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully update the status" })))
}

/// Deletes one of the caller's tasks.
#[delete("/delete/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    identity: AuthenticatedIdentity,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id.into_inner())
        .bind(identity.subject_id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(TASK_NOT_FOUND.into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted successfully" })))
}
