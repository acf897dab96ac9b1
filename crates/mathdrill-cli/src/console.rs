//! Terminal prompter.

use std::io::Write;

use mathdrill_core::{BoxFuture, CoreError, CoreResult, Prompter};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Prompts on stdout and reads answers from stdin, one line at a time.
pub struct ConsolePrompter {
    lines: Lines<BufReader<Stdin>>,
}

impl ConsolePrompter {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for ConsolePrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for ConsolePrompter {
    fn display(&mut self, text: &str) -> CoreResult<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", text)?;
        stdout.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> BoxFuture<'_, CoreResult<String>> {
        Box::pin(async move {
            match self.lines.next_line().await? {
                Some(line) => Ok(line),
                None => Err(CoreError::InputClosed),
            }
        })
    }
}
