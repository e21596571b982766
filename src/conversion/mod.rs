//! Batch conversion engine.
//!
//! The pieces, in the order data flows through them:
//!
//! - [`scan_images`](crate::scanner::scan_images) lists candidate inputs
//! - [`plan_tasks`] derives output paths and rejects name collisions
//! - [`BatchScheduler`] runs the tasks in bounded waves
//! - [`RunReport`] records one outcome per task
//!
//! [`convert_directory`] wires them together for the command-line front end.

mod plan;
mod report;
mod scheduler;
mod task;

pub use plan::{plan_tasks, Plan, Rejected};
pub use report::RunReport;
pub use scheduler::BatchScheduler;
pub use task::{ConversionTask, ImageTask, TaskOutcome, TaskStatus};

use std::sync::Arc;

use avifbatch_common::{Error, Result};
use tracing::info;

use crate::codec::Codec;
use crate::config::BatchConfig;
use crate::scanner::scan_images;

/// Convert every recognized image in the configured input directory.
///
/// Fails only for problems that make the whole run impossible: a missing
/// input directory or an output directory that cannot be created. Per-file
/// failures are recorded in the returned report. An input directory without
/// images yields an empty report and creates nothing.
pub async fn convert_directory(config: &BatchConfig, codec: Arc<dyn Codec>) -> Result<RunReport> {
    info!("Scanning {} for images...", config.input_dir().display());
    let files = scan_images(config.input_dir())?;

    if files.is_empty() {
        info!("No valid images found in {}", config.input_dir().display());
        return Ok(RunReport::empty());
    }

    info!(
        "Found {} images. Starting conversion with up to {} in flight...",
        files.len(),
        config.concurrency_limit()
    );

    std::fs::create_dir_all(config.output_dir()).map_err(|e| {
        Error::io(
            format!("creating output directory {}", config.output_dir().display()),
            e,
        )
    })?;

    let plan = plan_tasks(files, config);
    let report = BatchScheduler::new(config.clone(), codec)
        .run_plan(plan)
        .await;

    info!(
        "Image conversion complete: {} succeeded, {} failed, {} waves in {} ms",
        report.succeeded(),
        report.failed(),
        report.waves(),
        report.elapsed_ms()
    );

    Ok(report)
}
