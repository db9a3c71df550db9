pub mod task;
pub mod user;

pub use task::{StatusUpdate, SubTask, SubTaskInput, Task, TaskInput};
pub use user::User;
