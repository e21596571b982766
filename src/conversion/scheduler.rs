//! Wave-barrier batch scheduler.
//!
//! Tasks are split, in order, into consecutive waves of at most
//! `concurrency_limit` tasks. Every task of a wave runs on its own blocking
//! worker; the next wave is not started until every worker of the current
//! one has reported. A fast task therefore never picks up work early, but the
//! number of in-flight conversions (and the open files and codec memory that
//! come with them) can never exceed the limit.
//!
//! There is no timeout: a codec call that never returns stalls the batch at
//! its wave boundary.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::plan::Plan;
use super::report::{ReportBuilder, RunReport};
use super::task::{ConversionTask, ImageTask, TaskOutcome};
use crate::codec::Codec;
use crate::config::BatchConfig;

/// Dispatches conversion tasks in bounded waves and collects their outcomes.
pub struct BatchScheduler {
    config: BatchConfig,
    codec: Arc<dyn Codec>,
}

impl BatchScheduler {
    /// Create a scheduler. The concurrency limit was validated when the
    /// [`BatchConfig`] was built, so it is always at least 1 here.
    pub fn new(config: BatchConfig, codec: Arc<dyn Codec>) -> Self {
        Self { config, codec }
    }

    /// Number of waves needed for `tasks` tasks.
    pub fn wave_count(&self, tasks: usize) -> usize {
        tasks.div_ceil(self.config.concurrency_limit())
    }

    /// Run `tasks` and return one outcome per task.
    pub async fn run(&self, tasks: Vec<ImageTask>) -> RunReport {
        self.run_plan(Plan {
            tasks,
            rejected: Vec::new(),
        })
        .await
    }

    /// Run a plan. Rejected entries are recorded as failures first; they are
    /// never dispatched.
    pub async fn run_plan(&self, plan: Plan) -> RunReport {
        let mut report = ReportBuilder::new();

        for rejected in plan.rejected {
            error!(
                "Failed to convert {}: {}",
                rejected.task.input_path().display(),
                rejected.reason
            );
            report.record(TaskOutcome::failed(
                rejected.task,
                None,
                rejected.reason,
                Duration::ZERO,
            ));
        }

        let limit = self.config.concurrency_limit();
        let total_waves = self.wave_count(plan.tasks.len());
        let mut remaining = plan.tasks.into_iter().peekable();
        let mut wave = 0;

        while remaining.peek().is_some() {
            let tasks: Vec<ImageTask> = remaining.by_ref().take(limit).collect();
            debug!(
                "Starting wave {}/{} with {} tasks",
                wave + 1,
                total_waves,
                tasks.len()
            );

            for outcome in self.run_wave(wave, tasks).await {
                log_outcome(&outcome);
                report.record(outcome);
            }

            report.wave_completed();
            debug!(
                "Wave {}/{} complete, {} outcomes recorded",
                wave + 1,
                total_waves,
                report.len()
            );
            wave += 1;
        }

        report.finish()
    }

    /// Launch every task of one wave and wait for all of them.
    ///
    /// Outcomes come back in completion order. A worker that dies without
    /// reporting still yields a failed outcome for its task.
    async fn run_wave(&self, wave: usize, tasks: Vec<ImageTask>) -> Vec<TaskOutcome> {
        let mut set = JoinSet::new();

        for (slot, task) in tasks.iter().cloned().enumerate() {
            let codec = Arc::clone(&self.codec);
            set.spawn_blocking(move || {
                (slot, ConversionTask::new(task, wave).run(codec.as_ref()))
            });
        }

        let mut reported = vec![false; tasks.len()];
        let mut outcomes = Vec::with_capacity(tasks.len());

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((slot, outcome)) => {
                    reported[slot] = true;
                    outcomes.push(outcome);
                }
                Err(e) => error!("Conversion worker in wave {} failed: {}", wave + 1, e),
            }
        }

        for (task, done) in tasks.into_iter().zip(reported) {
            if !done {
                outcomes.push(TaskOutcome::failed(
                    task,
                    Some(wave),
                    "conversion worker terminated without reporting",
                    Duration::ZERO,
                ));
            }
        }

        outcomes
    }
}

fn log_outcome(outcome: &TaskOutcome) {
    let task = outcome.task();
    match outcome.error_detail() {
        None => info!(
            "Converted: {} -> {} ({} ms)",
            task.input_path().display(),
            task.output_path().display(),
            outcome.elapsed_ms()
        ),
        Some(detail) => error!(
            "Failed to convert {}: {}",
            task.input_path().display(),
            detail
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;
    use crate::conversion::plan::Rejected;
    use crate::conversion::task::TaskStatus;
    use parking_lot::{Condvar, Mutex};
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Records start/finish order and peak concurrency; fails inputs named `bad*`.
    #[derive(Default)]
    struct Recorder {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
        clock: AtomicUsize,
        events: Mutex<Vec<(String, usize, usize)>>,
    }

    impl Codec for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn encode(&self, input: &Path, _output: &Path, _quality: u8) -> Result<(), CodecError> {
            let started = self.clock.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);

            std::thread::sleep(Duration::from_millis(15));

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            let finished = self.clock.fetch_add(1, Ordering::SeqCst);

            let name = input.file_name().unwrap().to_string_lossy().into_owned();
            self.events.lock().push((name.clone(), started, finished));

            if name.starts_with("bad") {
                Err(CodecError::Other(format!("cannot decode {name}")))
            } else {
                Ok(())
            }
        }
    }

    /// Holds every call until `party` calls are in flight together, then
    /// releases them as a group. Gives up after a timeout so a scheduler that
    /// under-fills a wave fails the test instead of hanging it.
    struct Rendezvous {
        party: usize,
        // (arrived in current group, group generation)
        state: Mutex<(usize, usize)>,
        released: Condvar,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        timed_out: AtomicBool,
    }

    impl Rendezvous {
        fn new(party: usize) -> Self {
            Self {
                party,
                state: Mutex::new((0, 0)),
                released: Condvar::new(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                timed_out: AtomicBool::new(false),
            }
        }
    }

    impl Codec for Rendezvous {
        fn name(&self) -> &'static str {
            "rendezvous"
        }

        fn encode(&self, _input: &Path, _output: &Path, _quality: u8) -> Result<(), CodecError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let mut state = self.state.lock();
            let generation = state.1;
            state.0 += 1;
            if state.0 == self.party {
                state.0 = 0;
                state.1 += 1;
                self.released.notify_all();
            } else {
                while state.1 == generation {
                    let wait = self.released.wait_for(&mut state, Duration::from_secs(5));
                    if wait.timed_out() {
                        self.timed_out.store(true, Ordering::SeqCst);
                        break;
                    }
                }
            }
            drop(state);

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn tasks(names: &[&str]) -> Vec<ImageTask> {
        names
            .iter()
            .map(|n| ImageTask::new(format!("in/{n}"), format!("out/{n}.avif"), 50))
            .collect()
    }

    fn scheduler(limit: i64, codec: Arc<dyn Codec>) -> BatchScheduler {
        BatchScheduler::new(BatchConfig::new("in", "out", limit).unwrap(), codec)
    }

    #[tokio::test]
    async fn empty_task_list_gives_empty_report() {
        let recorder = Arc::new(Recorder::default());
        let report = scheduler(4, recorder.clone()).run(Vec::new()).await;

        assert_eq!(report.total(), 0);
        assert_eq!(report.waves(), 0);
        assert_eq!(recorder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn runs_ceil_n_over_k_waves_and_one_outcome_per_task() {
        for (n, k) in [(1, 1), (5, 2), (6, 3), (7, 10), (9, 4)] {
            let recorder = Arc::new(Recorder::default());
            let names: Vec<String> = (0..n).map(|i| format!("img{i}.png")).collect();
            let names: Vec<&str> = names.iter().map(String::as_str).collect();

            let sched = scheduler(k, recorder.clone());
            let report = sched.run(tasks(&names)).await;

            let expected_waves = (n as usize).div_ceil(k as usize);
            assert_eq!(report.waves(), expected_waves, "n={n} k={k}");
            assert_eq!(sched.wave_count(n as usize), expected_waves);
            assert_eq!(report.total(), n as usize, "n={n} k={k}");
            assert_eq!(recorder.calls.load(Ordering::SeqCst), n as usize);

            let mut seen: Vec<_> = report
                .outcomes()
                .iter()
                .map(|o| o.task().input_path().to_path_buf())
                .collect();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), n as usize, "duplicate or dropped outcome");
        }
    }

    #[tokio::test]
    async fn never_exceeds_concurrency_limit() {
        let recorder = Arc::new(Recorder::default());
        let names: Vec<String> = (0..9).map(|i| format!("img{i}.png")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();

        scheduler(3, recorder.clone()).run(tasks(&names)).await;

        let peak = recorder.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak concurrency {peak} exceeded limit");
    }

    #[tokio::test]
    async fn full_waves_run_all_tasks_at_once() {
        let codec = Arc::new(Rendezvous::new(3));
        let names: Vec<String> = (0..9).map(|i| format!("img{i}.png")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();

        let report = scheduler(3, codec.clone()).run(tasks(&names)).await;

        assert!(
            !codec.timed_out.load(Ordering::SeqCst),
            "a wave never had all of its tasks in flight together"
        );
        assert_eq!(codec.peak.load(Ordering::SeqCst), 3);
        assert_eq!(report.waves(), 3);
        assert_eq!(report.succeeded(), 9);
    }

    #[tokio::test]
    async fn next_wave_starts_only_after_previous_wave_finishes() {
        let recorder = Arc::new(Recorder::default());
        let names = ["a.png", "b.png", "c.png", "d.png", "e.png"];
        let report = scheduler(2, recorder.clone()).run(tasks(&names)).await;

        let events = recorder.events.lock().clone();
        let by_name = |n: &str| events.iter().find(|e| e.0 == n).cloned().unwrap();

        let waves: Vec<Vec<&str>> = vec![
            vec!["a.png", "b.png"],
            vec!["c.png", "d.png"],
            vec!["e.png"],
        ];
        for pair in waves.windows(2) {
            let last_finish = pair[0].iter().map(|n| by_name(n).2).max().unwrap();
            let first_start = pair[1].iter().map(|n| by_name(n).1).min().unwrap();
            assert!(
                first_start > last_finish,
                "wave started at {first_start} before previous finished at {last_finish}"
            );
        }

        let recorded_waves: Vec<Option<usize>> =
            report.outcomes().iter().map(|o| o.wave()).collect();
        assert_eq!(
            recorded_waves,
            vec![Some(0), Some(0), Some(1), Some(1), Some(2)]
        );
    }

    #[tokio::test]
    async fn failure_is_isolated_to_its_task() {
        let recorder = Arc::new(Recorder::default());
        let report = scheduler(2, recorder.clone())
            .run(tasks(&["a.png", "bad.jpg", "c.png"]))
            .await;

        assert_eq!(report.total(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);

        let failure = report.failures().next().unwrap();
        assert_eq!(failure.task().input_path(), Path::new("in/bad.jpg"));
        assert_eq!(failure.status(), TaskStatus::Failed);
        assert_eq!(failure.error_detail(), Some("cannot decode bad.jpg"));
        assert_eq!(recorder.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn rejected_tasks_are_reported_but_not_dispatched() {
        let recorder = Arc::new(Recorder::default());
        let plan = Plan {
            tasks: tasks(&["photo.png"]),
            rejected: vec![Rejected {
                task: ImageTask::new("in/photo.jpg", "out/photo.avif", 50),
                reason: "output path out/photo.avif collides with in/photo.png".into(),
            }],
        };

        let report = scheduler(2, recorder.clone()).run_plan(plan).await;

        assert_eq!(report.total(), 2);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.waves(), 1);
        assert_eq!(recorder.calls.load(Ordering::SeqCst), 1);

        let rejected = report.failures().next().unwrap();
        assert_eq!(rejected.wave(), None);
        assert!(rejected.error_detail().unwrap().contains("collides"));
    }

    #[tokio::test]
    async fn same_inputs_give_same_classification() {
        let names = ["a.png", "bad1.png", "c.webp", "bad2.jpg", "e.jpeg"];

        let classify = |report: RunReport| {
            let mut v: Vec<(String, TaskStatus)> = report
                .outcomes()
                .iter()
                .map(|o| (o.task().input_path().display().to_string(), o.status()))
                .collect();
            v.sort_by(|a, b| a.0.cmp(&b.0));
            v
        };

        let first = scheduler(2, Arc::new(Recorder::default())).run(tasks(&names)).await;
        let second = scheduler(2, Arc::new(Recorder::default())).run(tasks(&names)).await;
        assert_eq!(classify(first), classify(second));
    }
}
