pub mod task;
pub mod user;

pub use task::{
    CreateTaskRequest, NewTask, StatusUpdate, Task, TaskFilter, TaskListQuery, TaskPage, TaskStatus,
};
pub use user::{Credential, UpdateUserRequest, User};
