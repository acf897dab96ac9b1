//! The line-based prompt/response channel.
//!
//! Everything interactive (task questions, the authorization URL, the code
//! prompt) goes through a [`Prompter`]. The console implementation lives in
//! the CLI; [`ScriptedPrompter`] replays canned input.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;

use crate::error::{CoreError, CoreResult};

/// A boxed future for async trait methods.
///
/// Boxing keeps the traits object-safe so callers can hold `&mut dyn Prompter`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A prompt/response channel that shows text and yields one line at a time.
pub trait Prompter: Send {
    /// Shows one line of text to the user.
    fn display(&mut self, text: &str) -> CoreResult<()>;

    /// Suspends until the user enters a line, returned without its line ending.
    ///
    /// Fails with [`CoreError::InputClosed`] when no more input will arrive.
    fn read_line(&mut self) -> BoxFuture<'_, CoreResult<String>>;
}

/// A prompter that replays a fixed list of input lines and records output.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    inputs: VecDeque<String>,
    displayed: Vec<String>,
    reads: usize,
}

impl ScriptedPrompter {
    /// Creates a prompter that will answer with `inputs`, in order.
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            displayed: Vec::new(),
            reads: 0,
        }
    }

    /// Returns every line shown so far.
    pub fn displayed(&self) -> &[String] {
        &self.displayed
    }

    /// Returns how many lines were requested.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Returns the number of input lines not yet consumed.
    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn display(&mut self, text: &str) -> CoreResult<()> {
        self.displayed.push(text.to_string());
        Ok(())
    }

    fn read_line(&mut self) -> BoxFuture<'_, CoreResult<String>> {
        self.reads += 1;
        let line = self.inputs.pop_front().ok_or(CoreError::InputClosed);
        Box::pin(std::future::ready(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_prompter_replays_in_order() {
        let mut prompter = ScriptedPrompter::new(["first", "second"]);
        assert_eq!(prompter.read_line().await.unwrap(), "first");
        assert_eq!(prompter.read_line().await.unwrap(), "second");
        assert_eq!(prompter.reads(), 2);
        assert_eq!(prompter.remaining(), 0);
    }

    #[tokio::test]
    async fn scripted_prompter_reports_closed_input() {
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        let err = prompter.read_line().await.unwrap_err();
        assert!(matches!(err, CoreError::InputClosed));
    }

    #[test]
    fn scripted_prompter_records_output() {
        let mut prompter = ScriptedPrompter::default();
        prompter.display("hello").unwrap();
        assert_eq!(prompter.displayed(), ["hello".to_string()]);
    }
}
