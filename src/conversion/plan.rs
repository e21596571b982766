//! Turning scanned input files into tasks.
//!
//! Output names are `<stem>.avif` in the output directory, so inputs that
//! differ only by extension (`photo.png`, `photo.jpg`) claim the same path.
//! The first claimant in input order keeps it; later ones are rejected
//! before dispatch and reported as failures.

use std::collections::HashMap;
use std::path::PathBuf;

use avifbatch_common::paths::avif_file_name;
use tracing::warn;

use super::task::ImageTask;
use crate::config::BatchConfig;

/// A task that will not be dispatched, with the reason.
#[derive(Debug, Clone)]
pub struct Rejected {
    pub task: ImageTask,
    pub reason: String,
}

/// Tasks to run, in input order, plus tasks refused at planning time.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub tasks: Vec<ImageTask>,
    pub rejected: Vec<Rejected>,
}

impl Plan {
    /// Total number of tasks, dispatched or not.
    pub fn len(&self) -> usize {
        self.tasks.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the task list for `files`.
pub fn plan_tasks(files: Vec<PathBuf>, config: &BatchConfig) -> Plan {
    let mut plan = Plan::default();
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();

    for input in files {
        let Some(name) = avif_file_name(&input) else {
            let reason = format!("cannot derive an output name from {}", input.display());
            warn!("Not converting {:?}: {}", input, reason);
            let task = ImageTask::new(input, config.output_dir(), config.quality());
            plan.rejected.push(Rejected { task, reason });
            continue;
        };
        let output = config.output_dir().join(name);
        let task = ImageTask::new(input.clone(), output.clone(), config.quality());

        if let Some(first) = claimed.get(&output) {
            let reason = format!(
                "output path {} collides with {}",
                output.display(),
                first.display()
            );
            warn!("Not converting {:?}: {}", input, reason);
            plan.rejected.push(Rejected { task, reason });
            continue;
        }

        claimed.insert(output, input);
        plan.tasks.push(task);
    }

    plan
}
