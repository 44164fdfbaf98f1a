//! Intention Workers
//!
//! Runs a job on a background thread and exchanges messages with it.
//!
//! A worker is set up in two steps: [`Worker::give_tools`] hands it the
//! shared state the job needs, then [`Worker::give_job`] starts the thread.
//! Tools can't change once the job runs.

mod worker;

pub use worker::Worker;

/// Worker error
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("give_tools() must be called before give_job(), not after")]
    AlreadyStarted,
    
    #[error("Worker has no job yet, call give_job() first")]
    NotStarted,
    
    #[error("Worker thread is gone")]
    Disconnected,
    
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}
