use anyhow::anyhow;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// OS service reporting the currently active foreground task.
///
/// Called from the sampling thread. `Ok(None)` and `Err(_)` both mean "skip
/// this tick".
pub trait ForegroundTaskQuery: Send + Sync {
    fn current_foreground_task(&self) -> anyhow::Result<Option<String>>;
}

enum Step {
    Answer(Option<String>),
    Fail(String),
    Panic(String),
}

/// Query that replays a fixed script, then repeats a fallback answer.
#[derive(Default)]
pub struct ScriptedQuery {
    script: Mutex<VecDeque<Step>>,
    fallback: Option<String>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicBool,
}

impl ScriptedQuery {
    pub fn new<I, S>(tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(
                tasks
                    .into_iter()
                    .map(|task| Step::Answer(Some(task.into())))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Answer every query with `task`.
    pub fn repeating(task: impl Into<String>) -> Self {
        Self {
            fallback: Some(task.into()),
            ..Self::default()
        }
    }

    pub fn then_repeat(mut self, task: impl Into<String>) -> Self {
        self.fallback = Some(task.into());
        self
    }

    /// Block every query for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Step::Fail(message.into()));
        }
    }

    pub fn push_empty(&self) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Step::Answer(None));
        }
    }

    pub fn push_panic(&self, message: impl Into<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Step::Panic(message.into()));
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

impl ForegroundTaskQuery for ScriptedQuery {
    fn current_foreground_task(&self) -> anyhow::Result<Option<String>> {
        self.in_flight.store(true, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let next = self
            .script
            .lock()
            .map_err(|_| anyhow!("scripted query lock poisoned"))
            .map(|mut script| script.pop_front());
        self.in_flight.store(false, Ordering::SeqCst);

        match next? {
            Some(Step::Answer(task)) => Ok(task),
            Some(Step::Fail(message)) => Err(anyhow!(message)),
            Some(Step::Panic(message)) => panic!("{message}"),
            None => Ok(self.fallback.clone()),
        }
    }
}
