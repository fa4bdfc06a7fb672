/// Resource services
///
/// Business rules for projects and tasks: existence checks, defaults,
/// pagination. Services hold their repositories behind `Arc<dyn ...>` and are
/// cheap to clone.
pub mod project;
pub mod task;

pub use project::{ProjectQuery, ProjectService};
pub use task::{NewTask, TaskQuery, TaskService};
