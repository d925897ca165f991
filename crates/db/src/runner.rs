//! The consolidation worker's runner.
//!
//! Polls for pending runs, claims one, and drives it step by step
//! through the core pipeline. The persisted run record is saved after
//! every step, so a crashed worker resumes from the last completed step.
//! Cancellation is cooperative: the persisted status is re-read between
//! steps; each step is also bounded by a soft timeout that escalates to
//! Failed.

use std::time::Duration;

use meridian_core::consolidation::{
    ConsolidationError, ConsolidationPipeline, RunStatus,
};
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::repositories::consolidation::{ConsolidationRepoError, ConsolidationRepository};

/// Drives consolidation runs to completion.
#[derive(Clone)]
pub struct ConsolidationRunner {
    repo: ConsolidationRepository,
    step_timeout: Duration,
}

impl ConsolidationRunner {
    /// Creates a runner with the given per-step soft timeout.
    #[must_use]
    pub fn new(db: DatabaseConnection, step_timeout: Duration) -> Self {
        Self {
            repo: ConsolidationRepository::new(db),
            step_timeout,
        }
    }

    /// Claims and processes one pending run, if any.
    ///
    /// Returns the run id when a run was processed (to completion,
    /// failure, or cancellation).
    ///
    /// # Errors
    ///
    /// Returns persistence errors; step failures are recorded on the run
    /// and do not surface here.
    pub async fn run_pending_once(&self) -> Result<Option<Uuid>, ConsolidationRepoError> {
        let Some(mut run) = self.repo.claim_pending_run().await? else {
            return Ok(None);
        };
        let run_id = run.id;
        info!(run_id = %run_id, group_id = %run.group_id, period = %run.period, "Claimed consolidation run");

        // Inputs are loaded once and stay frozen for the whole run; the
        // steps are pure functions of them.
        let inputs = match self.repo.load_inputs(&run).await {
            Ok(inputs) => inputs,
            Err(err) => {
                error!(run_id = %run_id, error = %err, "Failed to load run inputs");
                run.status = RunStatus::Failed;
                run.error_message = Some(err.to_string());
                self.repo.save_run(&run).await?;
                self.repo.release_period_lock(&run).await?;
                return Ok(Some(run_id));
            }
        };

        loop {
            // Cooperative cancellation: a cancel request lands in the
            // persisted status and wins at the next step boundary.
            let persisted = self.repo.get_run(run_id).await?;
            if persisted.status == RunStatus::Cancelled {
                info!(run_id = %run_id, "Run cancelled; stopping at step boundary");
                run = persisted;
                break;
            }

            let step_future = async {
                ConsolidationPipeline::execute_next_step(&mut run, &inputs)
            };
            let outcome = match tokio::time::timeout(self.step_timeout, step_future).await {
                Ok(outcome) => outcome,
                Err(_elapsed) => {
                    warn!(run_id = %run_id, "Step exceeded soft timeout; failing run");
                    run.status = RunStatus::Failed;
                    run.error_message = Some("step timed out".to_string());
                    self.repo.save_run(&run).await?;
                    break;
                }
            };

            match outcome {
                Ok(Some(step)) => {
                    self.repo.save_run(&run).await?;
                    info!(run_id = %run_id, step = ?step, "Consolidation step completed");
                    if run.status == RunStatus::Completed {
                        break;
                    }
                }
                Ok(None) => {
                    self.repo.save_run(&run).await?;
                    break;
                }
                Err(ConsolidationError::InvalidRunStatus { current, .. }) => {
                    warn!(run_id = %run_id, status = ?current, "Run no longer executable");
                    break;
                }
                Err(err) => {
                    error!(run_id = %run_id, error = %err, "Consolidation step failed");
                    self.repo.save_run(&run).await?;
                    break;
                }
            }
        }

        self.repo.release_period_lock(&run).await?;
        Ok(Some(run_id))
    }

    /// Polls forever with the given interval. Used by the worker binary.
    pub async fn poll_loop(&self, interval: Duration) {
        loop {
            match self.run_pending_once().await {
                Ok(Some(_)) => {
                    // Drain the queue before sleeping again.
                    continue;
                }
                Ok(None) => {}
                Err(err) => {
                    error!(error = %err, "Consolidation poll failed");
                }
            }
            tokio::time::sleep(interval).await;
        }
    }
}
