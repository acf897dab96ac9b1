//! Arithmetic tasks and the sources that produce them.

use std::fmt;

use rand::Rng;
use rand::rngs::ThreadRng;

/// Upper bound (exclusive) for addition operands.
const ADDITION_MAX: i64 = 1000;

/// Range for the subtraction minuend.
const MINUEND_MIN: i64 = 100;
const MINUEND_MAX: i64 = 1000;

/// One question with its expected answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// The question as shown to the user, e.g. `"3+4="`.
    pub question: String,
    /// The correct answer.
    pub expected_answer: i64,
}

impl Task {
    /// Creates a new task.
    pub fn new(question: impl Into<String>, expected_answer: i64) -> Self {
        Self {
            question: question.into(),
            expected_answer,
        }
    }
}

/// The kinds of task a [`RandomTaskSource`] can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// `a + b` with both operands below 1000.
    Addition,
    /// `a - b` with `b < a`, so the answer is never negative.
    Subtraction,
}

impl TaskKind {
    /// Every task kind. Selection is uniform over this slice.
    pub const ALL: [TaskKind; 2] = [TaskKind::Addition, TaskKind::Subtraction];

    /// Picks a kind uniformly at random.
    pub fn choose<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Generates a task of this kind.
    pub fn generate<R: Rng>(self, rng: &mut R) -> Task {
        match self {
            Self::Addition => {
                let a = rng.random_range(0..ADDITION_MAX);
                let b = rng.random_range(0..ADDITION_MAX);
                Task::new(format!("{a}+{b}="), a + b)
            }
            Self::Subtraction => {
                let a = rng.random_range(MINUEND_MIN..MINUEND_MAX);
                let b = rng.random_range(0..a);
                Task::new(format!("{a}-{b}="), a - b)
            }
        }
    }

    /// Returns a short name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Subtraction => "subtraction",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces one task per call.
pub trait TaskSource {
    /// Returns the next task.
    fn next_task(&mut self) -> Task;
}

/// Generates independent random tasks, choosing uniformly among [`TaskKind::ALL`].
#[derive(Debug)]
pub struct RandomTaskSource<R = ThreadRng> {
    rng: R,
}

impl RandomTaskSource<ThreadRng> {
    /// Creates a source backed by the thread-local RNG.
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for RandomTaskSource<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomTaskSource<R> {
    /// Creates a source backed by the given RNG (use a seeded RNG for
    /// reproducible sequences).
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> TaskSource for RandomTaskSource<R> {
    fn next_task(&mut self) -> Task {
        let kind = TaskKind::choose(&mut self.rng);
        kind.generate(&mut self.rng)
    }
}

/// Replays a fixed list of tasks in order, starting over after the last.
///
/// An empty script yields `0+0=` every time.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTaskSource {
    tasks: Vec<Task>,
    next: usize,
}

impl ScriptedTaskSource {
    /// Creates a source that yields `tasks` in order.
    pub fn new(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            tasks: tasks.into_iter().collect(),
            next: 0,
        }
    }
}

impl TaskSource for ScriptedTaskSource {
    fn next_task(&mut self) -> Task {
        let Some(task) = self.tasks.get(self.next % self.tasks.len().max(1)) else {
            return Task::new("0+0=", 0);
        };
        self.next += 1;
        task.clone()
    }
}
