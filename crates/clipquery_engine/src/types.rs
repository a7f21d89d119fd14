use std::fmt;

use serde::Deserialize;

/// Job status as reported by `GET /job-status/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Maps a wire value. Unknown values count as still in progress.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "pending" => JobStatus::Pending,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Processing,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(JobStatus::from_wire(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobStatusReport {
    pub status: JobStatus,
    #[serde(default)]
    pub message: Option<String>,
    /// Session id, present once the job has completed.
    #[serde(default)]
    pub result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
    InvalidBaseUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::InvalidBaseUrl => write!(f, "invalid base url"),
            ApiErrorKind::HttpStatus(code) => write!(f, "http status {code}"),
            ApiErrorKind::Timeout => write!(f, "timeout"),
            ApiErrorKind::Network => write!(f, "network error"),
            ApiErrorKind::Decode => write!(f, "malformed response"),
        }
    }
}

/// How a polling task ended. Exactly one per poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed { session_id: Option<String> },
    Failed { message: Option<String> },
    TransportError(ApiError),
    GaveUp { attempts: u32 },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// `request` echoes the id given in the start command.
    JobStarted {
        request: u64,
        job_id: String,
    },
    JobStartFailed {
        request: u64,
        error: ApiError,
    },
    JobStatus {
        job_id: String,
        report: JobStatusReport,
    },
    JobPollFinished {
        job_id: String,
        outcome: PollOutcome,
    },
    QueryAnswered {
        answer: String,
    },
    QueryFailed {
        error: ApiError,
    },
    SessionStopped {
        session_id: String,
        message: Option<String>,
    },
    SessionStopFailed {
        session_id: String,
        error: ApiError,
    },
}
