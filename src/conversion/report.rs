//! Run report: every task outcome plus derived counts.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::task::{TaskOutcome, TaskStatus};

/// Final, read-only record of a batch run.
///
/// Outcomes are kept in completion order. Within a wave that order is
/// arbitrary; across waves every outcome of wave `n` precedes wave `n + 1`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    outcomes: Vec<TaskOutcome>,
    waves: usize,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    elapsed_ms: u64,
}

impl RunReport {
    /// A report for a run that found nothing to convert.
    pub fn empty() -> Self {
        ReportBuilder::new().finish()
    }

    pub fn outcomes(&self) -> &[TaskOutcome] {
        &self.outcomes
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.count(TaskStatus::Succeeded)
    }

    pub fn failed(&self) -> usize {
        self.count(TaskStatus::Failed)
    }

    /// Failed outcomes, in the order they were recorded.
    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Number of waves dispatched.
    pub fn waves(&self) -> usize {
        self.waves
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// True when every task succeeded (vacuously true for an empty run).
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Pretty JSON including the derived counts.
    pub fn to_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Summary<'a> {
            total: usize,
            succeeded: usize,
            failed: usize,
            #[serde(flatten)]
            report: &'a RunReport,
        }

        serde_json::to_string_pretty(&Summary {
            total: self.total(),
            succeeded: self.succeeded(),
            failed: self.failed(),
            report: self,
        })
    }

    fn count(&self, status: TaskStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status() == status).count()
    }
}

/// Single-writer accumulator owned by the scheduler's driving task.
///
/// Workers never see it; outcomes reach it only through the join of each
/// worker, so no locking is needed and nothing can be observed half-built.
#[derive(Debug)]
pub(crate) struct ReportBuilder {
    outcomes: Vec<TaskOutcome>,
    waves: usize,
    started_at: DateTime<Utc>,
    start: Instant,
}

impl ReportBuilder {
    pub(crate) fn new() -> Self {
        Self {
            outcomes: Vec::new(),
            waves: 0,
            started_at: Utc::now(),
            start: Instant::now(),
        }
    }

    pub(crate) fn record(&mut self, outcome: TaskOutcome) {
        self.outcomes.push(outcome);
    }

    pub(crate) fn wave_completed(&mut self) {
        self.waves += 1;
    }

    pub(crate) fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub(crate) fn finish(self) -> RunReport {
        RunReport {
            outcomes: self.outcomes,
            waves: self.waves,
            started_at: self.started_at,
            finished_at: Utc::now(),
            elapsed_ms: self.start.elapsed().as_millis() as u64,
        }
    }
}
