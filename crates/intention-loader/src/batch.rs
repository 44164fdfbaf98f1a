//! Fetch Batches
//!
//! Count-down barrier over the fetches issued since the last reset.

use crate::LoaderError;

/// Snapshot of a batch's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStatus {
    pub issued: usize,
    pub completed: usize,
    pub generation: u64,
    pub failed: bool,
}

impl BatchStatus {
    /// Number of fetches still in flight
    pub fn outstanding(&self) -> usize {
        self.issued - self.completed
    }
}

#[derive(Debug, Default)]
pub(crate) struct FetchBatch {
    issued: usize,
    completed: usize,
    generation: u64,
    failure: Option<LoaderError>,
}

impl FetchBatch {
    pub fn generation(&self) -> u64 {
        self.generation
    }
    
    pub fn issue(&mut self) {
        self.issued += 1;
    }
    
    pub fn complete(&mut self) {
        debug_assert!(self.completed < self.issued, "completed more fetches than issued");
        self.completed = (self.completed + 1).min(self.issued);
    }
    
    /// No fetch in flight
    pub fn is_idle(&self) -> bool {
        self.completed == self.issued
    }
    
    /// Every issued fetch has come back
    pub fn is_settled(&self) -> bool {
        self.issued > 0 && self.is_idle()
    }
    
    pub fn fail(&mut self, error: LoaderError) {
        self.failure.get_or_insert(error);
    }
    
    pub fn failure(&self) -> Option<&LoaderError> {
        self.failure.as_ref()
    }
    
    /// Start a new generation; completions from older ones no longer count
    pub fn reset(&mut self) {
        self.issued = 0;
        self.completed = 0;
        self.failure = None;
        self.generation += 1;
    }
    
    pub fn status(&self) -> BatchStatus {
        BatchStatus {
            issued: self.issued,
            completed: self.completed,
            generation: self.generation,
            failed: self.failure.is_some(),
        }
    }
}
