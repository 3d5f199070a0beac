//! Job lifecycle errors.

use std::time::Duration;

use crate::api::ApiError;
use crate::capability::Capability;

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Configuration or submission-time API failure (never retried).
    #[error("{capability}: {source}")]
    Api {
        capability: Capability,
        #[source]
        source: ApiError,
    },

    #[error("{capability} submission failed: {reason}")]
    SubmissionFailed {
        capability: Capability,
        reason: String,
    },

    #[error("{capability} failed for task_id {job_id} with code={code}, message={message}")]
    Failed {
        capability: Capability,
        job_id: String,
        code: String,
        message: String,
    },

    #[error("{capability} result query for task_id {job_id} rejected with code={code}, message={message}")]
    Rejected {
        capability: Capability,
        job_id: String,
        code: i64,
        message: String,
    },

    #[error("{capability} task_id {job_id} succeeded without a '{field}' url")]
    MissingResultUrl {
        capability: Capability,
        job_id: String,
        field: &'static str,
    },

    #[error("{capability} task_id {job_id} still running after {elapsed:?}")]
    DeadlineExceeded {
        capability: Capability,
        job_id: String,
        elapsed: Duration,
    },

    #[error("{capability} task_id {job_id}: giving up after {attempts} consecutive poll errors, last: {last}")]
    TransientLimit {
        capability: Capability,
        job_id: String,
        attempts: u32,
        last: String,
    },
}
