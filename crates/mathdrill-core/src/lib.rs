//! Core types: tasks, task sources, the session runner, results, tracing.

pub mod error;
pub mod prompt;
pub mod session;
pub mod task;
pub mod tracing;

pub use error::{CoreError, CoreResult};
pub use prompt::{BoxFuture, Prompter, ScriptedPrompter};
pub use session::{
    DEFAULT_SESSION_SIZE, SessionResult, SessionRunner, TaskOutcome, TaskStatus, format_timestamp,
    score,
};
pub use task::{RandomTaskSource, ScriptedTaskSource, Task, TaskKind, TaskSource};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
