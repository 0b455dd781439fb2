// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Send-job dispatcher.
//!
//! [`Dispatcher::dispatch`] validates, records a `queued` job, and returns the
//! job id at once. The sends run on a background task: one contact at a
//! time, in input order, pausing after every attempt. A failed contact is
//! counted and the loop moves on.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

use courier_core::{
    CourierError, Job, JobStatus, OutboundMessage, ProviderAdapter, StorageAdapter,
};

use crate::validation::{validate_contacts, validate_message};

/// Error text for a job where every send failed.
pub const NOTHING_SENT: &str = "no messages were sent";

/// Response to an accepted dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct Accepted {
    pub job_id: String,
    pub status: JobStatus,
    pub instance_id: String,
}

/// Per-job tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl std::fmt::Display for SendSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} succeeded, {} failed", self.succeeded, self.failed)
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    provider: Arc<dyn ProviderAdapter + Send + Sync>,
    interval: Duration,
    tracker: TaskTracker,
}

impl Dispatcher {
    pub fn new(
        storage: Arc<dyn StorageAdapter + Send + Sync>,
        provider: Arc<dyn ProviderAdapter + Send + Sync>,
        interval: Duration,
    ) -> Self {
        Self {
            storage,
            provider,
            interval,
            tracker: TaskTracker::new(),
        }
    }

    /// Accept a batch for `instance_id` and start sending in the background.
    pub async fn dispatch(
        &self,
        instance_id: &str,
        contacts: Vec<String>,
        message: String,
    ) -> Result<Accepted, CourierError> {
        validate_contacts(&contacts)?;
        validate_message(&message)?;
        self.require_remote_id(instance_id).await?;

        let job_id = uuid::Uuid::new_v4().to_string();
        self.storage.create_job(&job_id, JobStatus::Queued).await?;
        info!(job_id = %job_id, instance_id, contacts = contacts.len(), "send job queued");

        let this = self.clone();
        let id = job_id.clone();
        let instance = instance_id.to_string();
        self.tracker.spawn(async move {
            this.run_job(&id, &instance, &contacts, &message).await;
        });

        Ok(Accepted {
            job_id,
            status: JobStatus::Queued,
            instance_id: instance_id.to_string(),
        })
    }

    /// Dispatch to the most recently created instance.
    pub async fn dispatch_to_newest(
        &self,
        contacts: Vec<String>,
        message: String,
    ) -> Result<Accepted, CourierError> {
        validate_contacts(&contacts)?;
        validate_message(&message)?;
        let newest = self
            .storage
            .newest_instance()
            .await?
            .ok_or_else(|| CourierError::NotFound("no instances exist".into()))?;
        self.dispatch(&newest.id, contacts, message).await
    }

    pub async fn get_job(&self, job_id: &str) -> Result<Job, CourierError> {
        self.storage
            .get_job(job_id)
            .await?
            .ok_or_else(|| CourierError::NotFound(format!("job {job_id}")))
    }

    /// Execute a job to a terminal state.
    ///
    /// Any error outside the per-contact loop finalizes the job as `failed`
    /// with that error's text. A failure to write the terminal state is logged.
    pub async fn run_job(&self, job_id: &str, instance_id: &str, contacts: &[String], message: &str) {
        let outcome = self.execute(job_id, instance_id, contacts, message).await;

        let written = match outcome {
            Ok(summary) if summary.succeeded > 0 => {
                info!(job_id, %summary, "send job finished");
                self.storage
                    .update_job(job_id, JobStatus::Finished, Some(&summary.to_string()), None)
                    .await
            }
            Ok(summary) => {
                warn!(job_id, %summary, "send job delivered nothing");
                self.storage
                    .update_job(job_id, JobStatus::Failed, None, Some(NOTHING_SENT))
                    .await
            }
            Err(e) => {
                warn!(job_id, error = %e, "send job aborted");
                self.storage
                    .update_job(job_id, JobStatus::Failed, None, Some(&e.to_string()))
                    .await
            }
        };

        if let Err(e) = written {
            error!(job_id, error = %e, "failed to record terminal job state");
        }
    }

    async fn execute(
        &self,
        job_id: &str,
        instance_id: &str,
        contacts: &[String],
        message: &str,
    ) -> Result<SendSummary, CourierError> {
        self.storage
            .update_job(job_id, JobStatus::Running, None, None)
            .await?;
        let remote_id = self.require_remote_id(instance_id).await?;

        let mut summary = SendSummary::default();
        for contact in contacts {
            let outbound = OutboundMessage::text(contact, message);
            match self.provider.send_message(&remote_id, &outbound).await {
                Ok(_) => summary.succeeded += 1,
                Err(e) => {
                    warn!(job_id, contact = %contact, error = %e, "send failed");
                    summary.failed += 1;
                }
            }
            tokio::time::sleep(self.interval).await;
        }
        Ok(summary)
    }

    async fn require_remote_id(&self, instance_id: &str) -> Result<String, CourierError> {
        self.storage
            .current_mapping(instance_id)
            .await?
            .and_then(|m| m.remote_instance_id)
            .ok_or_else(|| CourierError::MappingUnavailable("instance not configured".into()))
    }

    /// Wait up to `timeout` for in-flight jobs after refusing new ones.
    pub async fn drain(&self, timeout: Duration) {
        self.tracker.close();
        if self.tracker.is_empty() {
            info!("no send jobs in flight");
            return;
        }
        info!(count = self.tracker.len(), "waiting for send jobs to complete");
        if tokio::time::timeout(timeout, self.tracker.wait()).await.is_err() {
            warn!(remaining = self.tracker.len(), "timeout reached, send jobs interrupted");
        }
    }
}
