pub mod task;

pub use task::{NewTask, TaskRecord};
