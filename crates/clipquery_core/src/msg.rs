use crate::{JobId, JobStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the video URL input.
    UrlInputChanged(String),
    /// User edited the query input.
    QueryInputChanged(String),
    /// User clicked Process.
    StartClicked,
    /// Backend accepted the job sent by start request `request`.
    JobStarted { request: u64, job_id: JobId },
    /// Start request `request` failed before a job id was assigned.
    JobStartFailed { request: u64, message: String },
    /// One poll response for a job.
    JobStatusReceived {
        job_id: JobId,
        status: JobStatus,
        message: Option<String>,
        result: Option<String>,
    },
    /// Polling ended on a transport, HTTP or decode error.
    JobPollFailed { job_id: JobId, message: String },
    /// Polling ended because the attempt or time limit was reached.
    JobPollGaveUp { job_id: JobId, attempts: u32 },
    /// User abandoned the job being polled.
    CancelClicked,
    /// User clicked Ask.
    QueryClicked,
    QueryAnswered { answer: String },
    QueryFailed { message: String },
    /// User clicked Stop.
    StopClicked,
    SessionStopped,
    SessionStopFailed { message: String },
    /// Front end has shown the pending alert.
    AlertDismissed,
}
