//! In-memory tracking of background conversion jobs.
//!
//! A job is inserted as `processing` before its background task starts and
//! receives exactly one terminal write (`completed` or `failed`). Nothing is
//! persisted; the map is lost when the process exits.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Processing)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One document-to-podcast request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    /// Sanitized name of the uploaded document.
    pub filename: String,
    pub input_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Generate an unguessable job identifier.
///
/// 128 random bits encoded as URL-safe base64 without padding (22 characters).
pub fn new_job_id() -> String {
    // A v4 UUID fixes the version and variant bits in bytes 6 and 8, so those
    // two bytes are taken from a second UUID's fully random bytes.
    let first = Uuid::new_v4().into_bytes();
    let second = Uuid::new_v4().into_bytes();

    let mut bytes = first;
    bytes[6] = second[0];
    bytes[8] = second[1];

    URL_SAFE_NO_PAD.encode(bytes)
}

/// Thread-safe job registry shared by the HTTP handlers and background tasks.
pub struct JobTracker {
    jobs: RwLock<HashMap<String, Job>>,
}

impl JobTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new job in `processing` state and return a snapshot of it.
    pub fn create(&self, id: &str, filename: &str, input_path: PathBuf) -> Job {
        let job = Job {
            id: id.to_string(),
            status: JobStatus::Processing,
            filename: filename.to_string(),
            input_path,
            output_path: None,
            error: None,
            created_at: Utc::now(),
            finished_at: None,
        };

        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        jobs.insert(job.id.clone(), job.clone());
        job
    }

    /// Look up a job by id.
    pub fn get(&self, id: &str) -> Option<Job> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        jobs.get(id).cloned()
    }

    /// Mark a job completed. Returns false if it was unknown or already finished.
    pub fn complete(&self, id: &str, output_path: PathBuf) -> bool {
        self.finish(id, |job| {
            job.status = JobStatus::Completed;
            job.output_path = Some(output_path);
        })
    }

    /// Mark a job failed. Returns false if it was unknown or already finished.
    pub fn fail(&self, id: &str, error: String) -> bool {
        self.finish(id, |job| {
            job.status = JobStatus::Failed;
            job.error = Some(error);
        })
    }

    fn finish(&self, id: &str, apply: impl FnOnce(&mut Job)) -> bool {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        match jobs.get_mut(id) {
            Some(job) if !job.status.is_terminal() => {
                apply(job);
                job.finished_at = Some(Utc::now());
                true
            }
            Some(job) => {
                warn!("Ignoring terminal update for job {} already {}", id, job.status);
                false
            }
            None => {
                warn!("Ignoring terminal update for unknown job {}", id);
                false
            }
        }
    }

    /// Number of tracked jobs.
    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new()
    }
}
