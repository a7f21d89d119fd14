//! Clipquery engine: backend API client, job polling and effect execution.
mod client;
mod engine;
mod persist;
mod poll;
mod types;

pub use client::{ApiClient, ClientSettings, ReqwestApiClient};
pub use engine::{EngineCommand, EngineHandle};
pub use persist::{write_atomically, PersistError};
pub use poll::{poll_job, PollEvent, PollSettings, PollSink};
pub use types::{ApiError, ApiErrorKind, EngineEvent, JobStatus, JobStatusReport, PollOutcome};
