//! Session runner and the result model it produces.
//!
//! A session asks a fixed number of tasks, one at a time, and records when
//! each was shown, when it was answered, what was typed, and whether it was
//! right. Wrong or unparsable answers are recorded, never fatal.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CoreResult;
use crate::prompt::Prompter;
use crate::task::TaskSource;

/// Number of tasks in a session unless configured otherwise.
pub const DEFAULT_SESSION_SIZE: usize = 10;

/// Timestamp format used when results leave the process (ISO-8601 with offset).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Formats a timestamp the way it is written to result tables.
pub fn format_timestamp(ts: &DateTime<Local>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Whether a task was answered correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// The answer matched.
    #[serde(rename = "OK")]
    Ok,
    /// The answer was wrong or not a number.
    #[serde(rename = "Error")]
    Error,
}

impl TaskStatus {
    /// Returns the label written to result tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scores a submitted answer against the expected one.
///
/// The answer is read like a leading integer: leading whitespace and an
/// optional sign are skipped, then the longest run of digits counts and the
/// rest is ignored (`"7abc"` reads as 7). No digits at all scores as
/// [`TaskStatus::Error`].
pub fn score(expected: i64, submitted: &str) -> TaskStatus {
    match leading_integer(submitted) {
        Some(value) if value == expected => TaskStatus::Ok,
        _ => TaskStatus::Error,
    }
}

fn leading_integer(input: &str) -> Option<i64> {
    let rest = input.trim_start();
    let (negative, rest) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    // Too many digits for i64 can never match an expected answer.
    let magnitude: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// The record of one answered task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutcome {
    /// When the question was shown.
    pub begin: DateTime<Local>,
    /// When the answer was entered.
    pub end: DateTime<Local>,
    /// The question text.
    pub question: String,
    /// Exactly what the user typed.
    pub submitted_answer: String,
    /// Whether the answer was correct.
    pub status: TaskStatus,
}

/// The aggregate record of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    /// When the session started.
    pub begin: DateTime<Local>,
    /// When the last task was answered. Equal to `begin` until finished.
    pub end: DateTime<Local>,
    /// Outcomes in the order the tasks were asked.
    pub tasks: Vec<TaskOutcome>,
}

impl SessionResult {
    fn started(begin: DateTime<Local>, capacity: usize) -> Self {
        Self {
            begin,
            end: begin,
            tasks: Vec::with_capacity(capacity),
        }
    }

    /// Number of correctly answered tasks.
    pub fn ok_count(&self) -> usize {
        self.count(TaskStatus::Ok)
    }

    /// Number of wrong or unparsable answers.
    pub fn error_count(&self) -> usize {
        self.tasks.len() - self.ok_count()
    }

    fn count(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }
}

/// Drives a fixed-size sequence of tasks through a prompter.
#[derive(Debug, Clone, Copy)]
pub struct SessionRunner {
    session_size: usize,
}

impl Default for SessionRunner {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_SIZE)
    }
}

impl SessionRunner {
    /// Creates a runner that asks `session_size` tasks.
    pub fn new(session_size: usize) -> Self {
        Self { session_size }
    }

    /// Returns the configured number of tasks.
    pub fn session_size(&self) -> usize {
        self.session_size
    }

    /// Runs a full session.
    ///
    /// Only a failing prompter ends the session early; every answer, right
    /// or wrong, is recorded.
    pub async fn run(
        &self,
        source: &mut dyn TaskSource,
        prompter: &mut dyn Prompter,
    ) -> CoreResult<SessionResult> {
        let mut result = SessionResult::started(Local::now(), self.session_size);
        info!(session_size = self.session_size, "session started");

        for ordinal in 1..=self.session_size {
            let task = source.next_task();
            let begin = Local::now();
            prompter.display(&format!("{}. {}", ordinal, task.question))?;

            let submitted_answer = prompter.read_line().await?;
            let end = Local::now();

            let status = score(task.expected_answer, &submitted_answer);
            debug!(ordinal, question = %task.question, %status, "task scored");

            result.tasks.push(TaskOutcome {
                begin,
                end,
                question: task.question,
                submitted_answer,
                status,
            });
        }

        result.end = Local::now();
        info!(
            ok = result.ok_count(),
            errors = result.error_count(),
            "session finished"
        );
        Ok(result)
    }
}
