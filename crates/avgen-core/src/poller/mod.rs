//! Submit a job and wait for a terminal status.
//!
//! Polling runs at a fixed interval with no backoff. By default it never gives
//! up: a job stays `"ing"` for as long as the remote says so, and transport or
//! decode failures during polling are logged and retried. [`PollPolicy`] can
//! optionally bound both.

mod error;
mod status;

pub use error::JobError;
pub use status::JobStatus;

use serde_json::Value;
use std::fmt;
use std::time::{Duration, Instant};

use crate::api::{ApiResponse, RequestSender};
use crate::capability::Capability;
use status::{parse_status, StatusError};

/// Default wait between result queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Opaque task id returned by a submission; only used as the polling key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A bare string is used verbatim, a number as its decimal text.
    ///
    /// The id names the downloaded files, so blank ids and ids that could
    /// step out of the output directory are refused.
    fn from_data(data: &Value) -> Option<Self> {
        let id = match data {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let path_like = id.contains('/') || id.contains('\\') || id.contains("..");
        if id.trim().is_empty() || path_like {
            return None;
        }
        Some(Self(id))
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Polling cadence and optional limits. The defaults wait forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Give up once the job has been polled for this long.
    pub deadline: Option<Duration>,
    /// Give up after this many consecutive transport/decode failures.
    pub max_transient_errors: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            deadline: None,
            max_transient_errors: None,
        }
    }
}

/// Blocking pause between poll attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current OS thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A job that reached `Success`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub capability: Capability,
    pub job_id: JobHandle,
    pub result_url: String,
    pub secondary_url: Option<String>,
}

enum Attempt {
    Done(JobOutcome),
    Pending,
    Transient(String),
}

pub struct JobPoller<S, Z = ThreadSleeper> {
    sender: S,
    policy: PollPolicy,
    sleeper: Z,
}

impl<S: RequestSender> JobPoller<S, ThreadSleeper> {
    pub fn new(sender: S, policy: PollPolicy) -> Self {
        Self {
            sender,
            policy,
            sleeper: ThreadSleeper,
        }
    }
}

impl<S: RequestSender, Z: Sleeper> JobPoller<S, Z> {
    pub fn with_sleeper<Z2: Sleeper>(self, sleeper: Z2) -> JobPoller<S, Z2> {
        JobPoller {
            sender: self.sender,
            policy: self.policy,
            sleeper,
        }
    }

    /// Submit and block until the job succeeds or fails.
    pub fn submit_and_await(
        &self,
        capability: Capability,
        payload: Value,
    ) -> Result<JobOutcome, JobError> {
        let handle = self.submit(capability, payload)?;
        self.await_result(capability, &handle)
    }

    /// Send the submission request; the envelope's `data` is the task id.
    pub fn submit(&self, capability: Capability, payload: Value) -> Result<JobHandle, JobError> {
        let request = capability.submit_request(payload);
        let response = self
            .sender
            .send(&request)
            .map_err(|source| JobError::Api { capability, source })?;
        let data = match response {
            ApiResponse::Data(data) => data,
            ApiResponse::Rejected { code, message } => {
                return Err(JobError::SubmissionFailed {
                    capability,
                    reason: format!(
                        "code={}, message={}",
                        code,
                        message.as_deref().unwrap_or("Unknown error")
                    ),
                })
            }
        };
        let handle = JobHandle::from_data(&data).ok_or_else(|| JobError::SubmissionFailed {
            capability,
            reason: format!("response carried no usable task id: {}", data),
        })?;
        tracing::info!(%capability, task_id = %handle, "request sent successfully");
        Ok(handle)
    }

    /// Poll the result endpoint until a terminal status.
    pub fn await_result(
        &self,
        capability: Capability,
        handle: &JobHandle,
    ) -> Result<JobOutcome, JobError> {
        let started = Instant::now();
        let mut consecutive_errors = 0u32;
        loop {
            match self.poll_once(capability, handle)? {
                Attempt::Done(outcome) => {
                    tracing::info!(
                        %capability,
                        task_id = %handle,
                        result_url = %outcome.result_url,
                        "job finished"
                    );
                    return Ok(outcome);
                }
                Attempt::Pending => {
                    consecutive_errors = 0;
                    tracing::info!(%capability, task_id = %handle, "status: ing, still waiting for result...");
                }
                Attempt::Transient(reason) => {
                    consecutive_errors += 1;
                    tracing::warn!(
                        %capability,
                        task_id = %handle,
                        attempt = consecutive_errors,
                        "error polling result, will retry: {}",
                        reason
                    );
                    if let Some(max) = self.policy.max_transient_errors {
                        if consecutive_errors >= max {
                            return Err(JobError::TransientLimit {
                                capability,
                                job_id: handle.to_string(),
                                attempts: consecutive_errors,
                                last: reason,
                            });
                        }
                    }
                }
            }

            if let Some(deadline) = self.policy.deadline {
                let elapsed = started.elapsed();
                if elapsed >= deadline {
                    return Err(JobError::DeadlineExceeded {
                        capability,
                        job_id: handle.to_string(),
                        elapsed,
                    });
                }
            }
            self.sleeper.sleep(self.policy.interval);
        }
    }

    /// One result query. Terminal failures are `Err`; everything retryable is an `Attempt`.
    fn poll_once(&self, capability: Capability, handle: &JobHandle) -> Result<Attempt, JobError> {
        let request = capability.result_request(handle.as_str());
        let data = match self.sender.send(&request) {
            Ok(ApiResponse::Data(data)) => data,
            Ok(ApiResponse::Rejected { code, message }) => {
                return Err(JobError::Rejected {
                    capability,
                    job_id: handle.to_string(),
                    code,
                    message: message.unwrap_or_else(|| "Unknown error".to_string()),
                })
            }
            Err(e) if e.is_transient() => return Ok(Attempt::Transient(e.to_string())),
            Err(source) => return Err(JobError::Api { capability, source }),
        };

        match parse_status(capability.spec(), &data) {
            Ok(JobStatus::Pending) => Ok(Attempt::Pending),
            Ok(JobStatus::Success {
                result_url,
                secondary_url,
            }) => Ok(Attempt::Done(JobOutcome {
                capability,
                job_id: handle.clone(),
                result_url,
                secondary_url,
            })),
            Ok(JobStatus::Failed { code, message }) => Err(JobError::Failed {
                capability,
                job_id: handle.to_string(),
                code,
                message,
            }),
            Err(StatusError::Malformed(reason)) => Ok(Attempt::Transient(reason)),
            Err(StatusError::MissingResultUrl(field)) => Err(JobError::MissingResultUrl {
                capability,
                job_id: handle.to_string(),
                field,
            }),
        }
    }
}
