use crate::{JobId, SessionId};

/// IO requested by the controller. The front end hands these to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// `request` is echoed back in the reply so it can be matched to this start.
    StartJob { request: u64, url: String },
    PollJob { job_id: JobId },
    CancelPoll { job_id: JobId },
    RunQuery { query: String, session_id: SessionId },
    StopSession { session_id: SessionId },
}
