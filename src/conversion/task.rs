//! A single conversion: one input, one output, one codec call.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::codec::Codec;

/// One unit of work. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageTask {
    input_path: PathBuf,
    output_path: PathBuf,
    quality: u8,
}

impl ImageTask {
    /// Create a task. Quality above 100 is clamped to 100.
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        quality: u8,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            quality: quality.min(100),
        }
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

/// Terminal state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Succeeded,
    Failed,
}

/// Result of running (or refusing to run) one [`ImageTask`].
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutcome {
    task: ImageTask,
    status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_detail: Option<String>,
    wave: Option<usize>,
    elapsed_ms: u64,
}

impl TaskOutcome {
    pub fn succeeded(task: ImageTask, wave: usize, elapsed: Duration) -> Self {
        Self {
            task,
            status: TaskStatus::Succeeded,
            error_detail: None,
            wave: Some(wave),
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn failed(
        task: ImageTask,
        wave: Option<usize>,
        detail: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            task,
            status: TaskStatus::Failed,
            error_detail: Some(detail.into()),
            wave,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn task(&self) -> &ImageTask {
        &self.task
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Why the task failed; `None` on success.
    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    /// Wave the task ran in; `None` if it was never dispatched.
    pub fn wave(&self) -> Option<usize> {
        self.wave
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Succeeded
    }
}

/// Runs one task against a codec and converts every failure, panics
/// included, into a [`TaskOutcome`].
pub struct ConversionTask {
    task: ImageTask,
    wave: usize,
}

impl ConversionTask {
    pub fn new(task: ImageTask, wave: usize) -> Self {
        Self { task, wave }
    }

    /// Run the codec. Never panics and never returns an error.
    pub fn run(self, codec: &dyn Codec) -> TaskOutcome {
        let start = Instant::now();
        let task = &self.task;

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            codec.encode(task.input_path(), task.output_path(), task.quality())
        }));
        let elapsed = start.elapsed();

        match result {
            Ok(Ok(())) => TaskOutcome::succeeded(self.task, self.wave, elapsed),
            Ok(Err(e)) => TaskOutcome::failed(self.task, Some(self.wave), e.to_string(), elapsed),
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                TaskOutcome::failed(
                    self.task,
                    Some(self.wave),
                    format!("{} codec panicked: {message}", codec.name()),
                    elapsed,
                )
            }
        }
    }
}
