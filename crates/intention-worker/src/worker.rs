//! Background Worker
//!
//! Message-driven job running on its own thread.

use crate::WorkerError;
use smol::channel::{self, Receiver, Sender};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

static WORKER_ID: AtomicU32 = AtomicU32::new(1);

type Callback<R> = Arc<Mutex<Box<dyn FnMut(R) + Send>>>;
type Handler<R> = Arc<Mutex<Option<Callback<R>>>>;

/// Running job
struct Job<A, R> {
    inbox: Sender<A>,
    outbox: Receiver<R>,
    thread: Option<JoinHandle<()>>,
}

/// Worker running `job(&tools, args)` for every message it gets
///
/// Results go to the handler installed with [`Worker::when_complete`], or
/// queue up for [`Worker::recv`] when there is none. Messages are handled
/// in the order they were posted.
pub struct Worker<T, A, R> {
    id: u32,
    tools: Option<T>,
    job: Option<Job<A, R>>,
    handler: Handler<R>,
}

impl<T, A, R> Worker<T, A, R>
where
    T: Default + Send + 'static,
    A: Send + 'static,
    R: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            id: WORKER_ID.fetch_add(1, Ordering::SeqCst),
            tools: Some(T::default()),
            job: None,
            handler: Arc::new(Mutex::new(None)),
        }
    }
    
    pub fn id(&self) -> u32 {
        self.id
    }
    
    /// Check if a job was given
    pub fn is_started(&self) -> bool {
        self.job.is_some()
    }
    
    /// Hand over the state the job works with
    pub fn give_tools(&mut self, tools: T) -> Result<&mut Self, WorkerError> {
        if self.job.is_some() {
            return Err(WorkerError::AlreadyStarted);
        }
        
        self.tools = Some(tools);
        Ok(self)
    }
    
    /// Start the background thread running `job`
    pub fn give_job<F>(&mut self, job: F) -> Result<&mut Self, WorkerError>
    where
        F: Fn(&T, A) -> R + Send + 'static,
    {
        if self.job.is_some() {
            return Err(WorkerError::AlreadyStarted);
        }
        
        let tools = self.tools.take().unwrap_or_default();
        let (inbox, jobs) = channel::unbounded::<A>();
        let (results, outbox) = channel::unbounded::<R>();
        let handler = self.handler.clone();
        let id = self.id;
        
        let thread = std::thread::Builder::new()
            .name(format!("intention-worker-{}", id))
            .spawn(move || {
                tracing::debug!("Worker {} started", id);
                
                while let Ok(args) = jobs.recv_blocking() {
                    let output = job(&tools, args);
                    
                    // Cloned out so the callback can install a new handler
                    let current = handler.lock().unwrap_or_else(PoisonError::into_inner).clone();
                    match current {
                        Some(callback) => {
                            let mut callback = callback.lock().unwrap_or_else(PoisonError::into_inner);
                            (*callback)(output);
                        }
                        None => {
                            if results.send_blocking(output).is_err() {
                                break;
                            }
                        }
                    }
                }
                
                tracing::debug!("Worker {} stopped", id);
            })?;
        
        self.job = Some(Job {
            inbox,
            outbox,
            thread: Some(thread),
        });
        
        tracing::info!("Worker {} got a job", self.id);
        Ok(self)
    }
    
    /// Post a message to the job
    pub fn work(&self, args: A) -> Result<&Self, WorkerError> {
        let job = self.job.as_ref().ok_or(WorkerError::NotStarted)?;
        job.inbox.try_send(args).map_err(|_| WorkerError::Disconnected)?;
        Ok(self)
    }
    
    /// Install the handler called with every result
    ///
    /// May be called from inside the current handler; the new one takes
    /// over from the next result on.
    pub fn when_complete<F>(&self, callback: F) -> &Self
    where
        F: FnMut(R) + Send + 'static,
    {
        let callback: Box<dyn FnMut(R) + Send> = Box::new(callback);
        *self.handler.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(Mutex::new(callback)));
        self
    }
    
    /// Wait for the next queued result
    pub async fn recv(&self) -> Result<R, WorkerError> {
        let job = self.job.as_ref().ok_or(WorkerError::NotStarted)?;
        job.outbox.recv().await.map_err(|_| WorkerError::Disconnected)
    }
    
    /// Take a queued result if there is one
    pub fn try_recv(&self) -> Option<R> {
        self.job.as_ref().and_then(|job| job.outbox.try_recv().ok())
    }
    
    /// Stop accepting messages and wait for the thread to finish
    ///
    /// Messages already posted are still handled.
    pub fn terminate(&mut self) {
        if let Some(job) = self.job.as_mut() {
            job.inbox.close();
            if let Some(thread) = job.thread.take() {
                if thread.join().is_err() {
                    tracing::warn!("Worker {} panicked", self.id);
                }
            }
        }
    }
    
    /// Check if terminated
    pub fn is_terminated(&self) -> bool {
        self.job.as_ref().is_some_and(|job| job.inbox.is_closed())
    }
}

impl<T, A, R> Default for Worker<T, A, R>
where
    T: Default + Send + 'static,
    A: Send + 'static,
    R: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A, R> std::fmt::Debug for Worker<T, A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("started", &self.job.is_some())
            .finish_non_exhaustive()
    }
}

impl<T, A, R> Drop for Worker<T, A, R> {
    fn drop(&mut self) {
        if let Some(job) = &self.job {
            job.inbox.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_tools_after_job_rejected() {
        let mut worker: Worker<i32, i32, i32> = Worker::new();
        worker.give_tools(2).unwrap();
        worker.give_job(|factor, n| factor * n).unwrap();
        
        assert!(matches!(worker.give_tools(3), Err(WorkerError::AlreadyStarted)));
        assert!(matches!(worker.give_job(|_, n| n), Err(WorkerError::AlreadyStarted)));
    }
    
    #[test]
    fn test_work_before_job() {
        let worker: Worker<(), i32, i32> = Worker::new();
        
        assert!(!worker.is_started());
        assert!(matches!(worker.work(1), Err(WorkerError::NotStarted)));
        assert!(worker.try_recv().is_none());
    }
    
    #[test]
    fn test_recv_results_in_order() {
        let mut worker: Worker<i32, i32, i32> = Worker::new();
        worker.give_tools(10).unwrap().give_job(|base, n| base + n).unwrap();
        
        worker.work(1).unwrap().work(2).unwrap().work(3).unwrap();
        
        let results: Vec<i32> = smol::block_on(async {
            let mut out = Vec::new();
            for _ in 0..3 {
                out.push(worker.recv().await.unwrap());
            }
            out
        });
        assert_eq!(results, vec![11, 12, 13]);
    }
    
    #[test]
    fn test_terminate() {
        let mut worker: Worker<(), (), ()> = Worker::new();
        worker.give_job(|_, _| ()).unwrap();
        
        worker.terminate();
        
        assert!(worker.is_terminated());
        assert!(matches!(worker.work(()), Err(WorkerError::Disconnected)));
    }
}
