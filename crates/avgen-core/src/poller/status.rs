//! Interpret the `data` object returned by a result endpoint.

use serde_json::Value;

use crate::capability::{CapabilitySpec, PENDING_STATUS};

const UNKNOWN_ERROR: &str = "Unknown error";

/// State of a remote job as reported by one result query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// `"ing"`: keep waiting.
    Pending,
    /// Terminal: the job produced its assets.
    Success {
        result_url: String,
        secondary_url: Option<String>,
    },
    /// Terminal: any status other than pending or the success literal.
    Failed { code: String, message: String },
}

/// Why a result payload could not be turned into a [`JobStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StatusError {
    /// No `status` string; treated like a transient parse failure.
    Malformed(String),
    /// Success reported without the primary URL field; terminal.
    MissingResultUrl(&'static str),
}

fn string_field(data: &Value, field: &str) -> Option<String> {
    data.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn parse_status(spec: &CapabilitySpec, data: &Value) -> Result<JobStatus, StatusError> {
    let Some(status) = data.get("status").and_then(Value::as_str) else {
        return Err(StatusError::Malformed(format!(
            "result has no status field: {}",
            data
        )));
    };

    if status == PENDING_STATUS {
        return Ok(JobStatus::Pending);
    }
    if status == spec.success_status {
        let result_url = string_field(data, spec.result_url_field)
            .ok_or(StatusError::MissingResultUrl(spec.result_url_field))?;
        let secondary_url = spec
            .secondary_url_field
            .and_then(|field| string_field(data, field));
        return Ok(JobStatus::Success {
            result_url,
            secondary_url,
        });
    }
    Ok(JobStatus::Failed {
        code: status.to_string(),
        message: string_field(data, "msg").unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
    })
}
