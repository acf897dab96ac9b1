//! Publishing a session result to the remote tables.
//!
//! A result becomes two batches: one summary row for the session and one
//! detail row per task. Both are appended concurrently. The publish waits
//! for both to settle and only succeeds if both do. There is no compensation
//! when exactly one of them lands.

use futures_util::future::join;
use mathdrill_core::{BoxFuture, SessionResult, format_timestamp};
use serde_json::Value;
use tracing::{error, info};

use crate::error::{SheetsError, SheetsResult};

/// One spreadsheet row.
pub type Row = Vec<Value>;

/// Default range of the per-session summary table.
pub const DEFAULT_SUMMARY_RANGE: &str = "STAT!A1:D1";

/// Default range of the per-task detail table.
pub const DEFAULT_DETAIL_RANGE: &str = "DETAIL!A1:E1";

/// What an append reported back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    /// The table the values were appended to, if the sheet had one.
    pub table_range: Option<String>,
    /// The cells that were written.
    pub updated_range: Option<String>,
    /// Number of rows written.
    pub updated_rows: usize,
}

/// A remote table store that can append rows.
///
/// Appends insert new rows and interpret values as if typed by a user.
pub trait TableAppender: Send + Sync {
    /// Appends `rows` to the table at `range` in `spreadsheet_id`.
    fn append<'a>(
        &'a self,
        spreadsheet_id: &'a str,
        range: &'a str,
        rows: Vec<Row>,
    ) -> BoxFuture<'a, SheetsResult<AppendOutcome>>;
}

/// Where results are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTarget {
    /// Spreadsheet identifier (the long id in the sheet URL).
    pub spreadsheet_id: String,
    /// Range of the summary table.
    pub summary_range: String,
    /// Range of the detail table.
    pub detail_range: String,
}

impl TableTarget {
    /// Creates a target with the default table ranges.
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            summary_range: DEFAULT_SUMMARY_RANGE.to_string(),
            detail_range: DEFAULT_DETAIL_RANGE.to_string(),
        }
    }

    /// Sets the summary range.
    pub fn with_summary_range(mut self, range: impl Into<String>) -> Self {
        self.summary_range = range.into();
        self
    }

    /// Sets the detail range.
    pub fn with_detail_range(mut self, range: impl Into<String>) -> Self {
        self.detail_range = range.into();
        self
    }
}

/// `[begin, end, ok_count, error_count]`
pub fn summary_row(result: &SessionResult) -> Row {
    vec![
        Value::from(format_timestamp(&result.begin)),
        Value::from(format_timestamp(&result.end)),
        Value::from(result.ok_count()),
        Value::from(result.error_count()),
    ]
}

/// `[begin, end, question, submitted_answer, status]` for each task, in order.
pub fn detail_rows(result: &SessionResult) -> Vec<Row> {
    result
        .tasks
        .iter()
        .map(|task| {
            vec![
                Value::from(format_timestamp(&task.begin)),
                Value::from(format_timestamp(&task.end)),
                Value::from(task.question.as_str()),
                Value::from(task.submitted_answer.as_str()),
                Value::from(task.status.as_str()),
            ]
        })
        .collect()
}

/// Writes session results through a [`TableAppender`].
#[derive(Debug)]
pub struct ResultPublisher<'a, A: ?Sized> {
    appender: &'a A,
}

impl<'a, A: TableAppender + ?Sized> ResultPublisher<'a, A> {
    /// Creates a publisher writing through `appender`.
    pub fn new(appender: &'a A) -> Self {
        Self { appender }
    }

    /// Appends the summary and the detail rows of `result`.
    ///
    /// Issues exactly one append per table, concurrently, and returns only
    /// once both have settled. Fails with
    /// [`SheetsErrorCode::Publish`](crate::SheetsErrorCode::Publish) if
    /// either fails, reporting the summary failure first.
    pub async fn publish(&self, target: &TableTarget, result: &SessionResult) -> SheetsResult<()> {
        let summary = self.append_table(target, &target.summary_range, vec![summary_row(result)]);
        let detail = self.append_table(target, &target.detail_range, detail_rows(result));

        // Never drop an in-flight append: the remote table would be left unknown.
        let (summary, detail) = join(summary, detail).await;
        let (summary, detail) = (summary?, detail?);
        info!(
            summary_rows = summary.updated_rows,
            detail_rows = detail.updated_rows,
            "results published"
        );
        Ok(())
    }

    async fn append_table(
        &self,
        target: &TableTarget,
        range: &str,
        rows: Vec<Row>,
    ) -> SheetsResult<AppendOutcome> {
        self.appender
            .append(&target.spreadsheet_id, range, rows)
            .await
            .map_err(|e| {
                error!("append to {} failed: {}", range, e);
                SheetsError::publish(format!("append to {} failed", range)).with_source(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SheetsErrorCode;
    use chrono::{Duration, Local};
    use mathdrill_core::{TaskOutcome, TaskStatus};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Records every append and fails the ones aimed at `fail_range`.
    #[derive(Default)]
    struct RecordingAppender {
        calls: Mutex<Vec<(String, String, Vec<Row>)>>,
        fail_range: Option<String>,
    }

    impl RecordingAppender {
        fn failing(range: &str) -> Self {
            Self {
                fail_range: Some(range.to_string()),
                ..Self::default()
            }
        }

        fn calls_to(&self, range: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, r, _)| r == range)
                .count()
        }
    }

    impl TableAppender for RecordingAppender {
        fn append<'a>(
            &'a self,
            spreadsheet_id: &'a str,
            range: &'a str,
            rows: Vec<Row>,
        ) -> BoxFuture<'a, SheetsResult<AppendOutcome>> {
            let updated_rows = rows.len();
            self.calls.lock().unwrap().push((
                spreadsheet_id.to_string(),
                range.to_string(),
                rows,
            ));
            let outcome = if self.fail_range.as_deref() == Some(range) {
                Err(SheetsError::server("API error (500): backend error"))
            } else {
                Ok(AppendOutcome {
                    updated_rows,
                    ..AppendOutcome::default()
                })
            };
            Box::pin(std::future::ready(outcome))
        }
    }

    fn outcome(question: &str, answer: &str, status: TaskStatus) -> TaskOutcome {
        let begin = Local::now();
        TaskOutcome {
            begin,
            end: begin + Duration::seconds(3),
            question: question.to_string(),
            submitted_answer: answer.to_string(),
            status,
        }
    }

    fn two_task_result() -> SessionResult {
        let begin = Local::now();
        SessionResult {
            begin,
            end: begin + Duration::seconds(10),
            tasks: vec![
                outcome("3+4=", "7", TaskStatus::Ok),
                outcome("10-2=", "5", TaskStatus::Error),
            ],
        }
    }

    #[test]
    fn summary_row_counts() {
        let result = two_task_result();
        let row = summary_row(&result);
        assert_eq!(row.len(), 4);
        assert_eq!(row[0], Value::from(format_timestamp(&result.begin)));
        assert_eq!(row[1], Value::from(format_timestamp(&result.end)));
        assert_eq!(row[2], Value::from(1));
        assert_eq!(row[3], Value::from(1));
    }

    #[test]
    fn summary_counts_add_up_to_task_count() {
        let mut result = two_task_result();
        result.tasks.push(outcome("1+1=", "two", TaskStatus::Error));
        let row = summary_row(&result);
        let ok = row[2].as_u64().unwrap();
        let errors = row[3].as_u64().unwrap();
        assert_eq!(ok + errors, result.tasks.len() as u64);
    }

    #[test]
    fn detail_rows_follow_task_order() {
        let result = two_task_result();
        let rows = detail_rows(&result);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][2], "3+4=");
        assert_eq!(rows[0][3], "7");
        assert_eq!(rows[0][4], "OK");
        assert_eq!(rows[1][2], "10-2=");
        assert_eq!(rows[1][3], "5");
        assert_eq!(rows[1][4], "Error");
        assert_eq!(rows[1].len(), 5);
    }

    #[test]
    fn target_defaults() {
        let target = TableTarget::new("sheet");
        assert_eq!(target.summary_range, "STAT!A1:D1");
        assert_eq!(target.detail_range, "DETAIL!A1:E1");

        let target = target
            .with_summary_range("Summary!A1:D1")
            .with_detail_range("Tasks!A1:E1");
        assert_eq!(target.summary_range, "Summary!A1:D1");
        assert_eq!(target.detail_range, "Tasks!A1:E1");
    }

    #[tokio::test]
    async fn publish_appends_once_per_table() {
        let appender = RecordingAppender::default();
        let target = TableTarget::new("sheet-123");
        let result = two_task_result();

        ResultPublisher::new(&appender)
            .publish(&target, &result)
            .await
            .unwrap();

        assert_eq!(appender.calls_to(DEFAULT_SUMMARY_RANGE), 1);
        assert_eq!(appender.calls_to(DEFAULT_DETAIL_RANGE), 1);

        let calls = appender.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        for (spreadsheet_id, range, rows) in calls.iter() {
            assert_eq!(spreadsheet_id, "sheet-123");
            if range == DEFAULT_SUMMARY_RANGE {
                assert_eq!(rows, &vec![summary_row(&result)]);
            } else {
                assert_eq!(rows, &detail_rows(&result));
            }
        }
    }

    #[tokio::test]
    async fn publish_fails_when_detail_append_fails() {
        let appender = RecordingAppender::failing(DEFAULT_DETAIL_RANGE);
        let err = ResultPublisher::new(&appender)
            .publish(&TableTarget::new("sheet"), &two_task_result())
            .await
            .unwrap_err();

        assert_eq!(err.code(), SheetsErrorCode::Publish);
        assert!(err.message().contains(DEFAULT_DETAIL_RANGE));
        assert_eq!(appender.calls_to(DEFAULT_SUMMARY_RANGE), 1);
        assert_eq!(appender.calls_to(DEFAULT_DETAIL_RANGE), 1);
    }

    #[tokio::test]
    async fn publish_fails_when_summary_append_fails() {
        use std::error::Error;
        let appender = RecordingAppender::failing(DEFAULT_SUMMARY_RANGE);
        let err = ResultPublisher::new(&appender)
            .publish(&TableTarget::new("sheet"), &two_task_result())
            .await
            .unwrap_err();

        assert_eq!(err.code(), SheetsErrorCode::Publish);
        assert!(err.source().unwrap().to_string().contains("backend error"));
    }

    /// Fails the summary append at once and settles the detail append later.
    #[derive(Default)]
    struct SlowDetailAppender {
        detail_settled: AtomicBool,
    }

    impl TableAppender for SlowDetailAppender {
        fn append<'a>(
            &'a self,
            _spreadsheet_id: &'a str,
            range: &'a str,
            rows: Vec<Row>,
        ) -> BoxFuture<'a, SheetsResult<AppendOutcome>> {
            if range == DEFAULT_SUMMARY_RANGE {
                return Box::pin(std::future::ready(Err(SheetsError::network(
                    "connection reset",
                ))));
            }
            Box::pin(async move {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                self.detail_settled.store(true, Ordering::SeqCst);
                Ok(AppendOutcome {
                    updated_rows: rows.len(),
                    ..AppendOutcome::default()
                })
            })
        }
    }

    #[tokio::test]
    async fn publish_waits_for_pending_append_after_failure() {
        let appender = SlowDetailAppender::default();
        let err = ResultPublisher::new(&appender)
            .publish(&TableTarget::new("sheet"), &two_task_result())
            .await
            .unwrap_err();

        assert_eq!(err.code(), SheetsErrorCode::Publish);
        assert!(err.message().contains(DEFAULT_SUMMARY_RANGE));
        assert!(appender.detail_settled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn publish_through_trait_object() {
        let appender = RecordingAppender::default();
        let dyn_appender: &dyn TableAppender = &appender;
        ResultPublisher::new(dyn_appender)
            .publish(&TableTarget::new("sheet"), &two_task_result())
            .await
            .unwrap();
        assert_eq!(appender.calls.lock().unwrap().len(), 2);
    }
}
