//! Timers
//!
//! Repeating callbacks, optionally shared under a key.

use smol::stream::StreamExt;
use smol::Task;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Shortest interval a timer ticks at
const MIN_INTERVAL: Duration = Duration::from_millis(1);

type Callback = Arc<dyn Fn() + Send + Sync>;

struct TimerState {
    interval: Duration,
    callback: Callback,
    task: Option<Task<()>>,
}

/// Repeating timer
///
/// Ticks run on the global `smol` executor. Stopping (or dropping) the
/// timer cancels the pending tick.
pub struct Timer {
    state: Mutex<TimerState>,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TimerState {
                interval: MIN_INTERVAL,
                callback: Arc::new(|| {}),
                task: None,
            }),
        }
    }
    
    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
    
    /// Set the interval used by the next start
    pub fn set_interval(&self, interval: Duration) -> &Self {
        self.lock().interval = interval.max(MIN_INTERVAL);
        self
    }
    
    pub fn interval(&self) -> Duration {
        self.lock().interval
    }
    
    /// Set the callback used by the next start
    pub fn set_callback<F>(&self, callback: F) -> &Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.lock().callback = Arc::new(callback);
        self
    }
    
    /// Start ticking, replacing a running schedule
    pub fn start(&self, interval: Option<Duration>) -> &Self {
        let mut state = self.lock();
        if let Some(interval) = interval {
            state.interval = interval.max(MIN_INTERVAL);
        }
        
        let period = state.interval;
        let callback = state.callback.clone();
        tracing::debug!("Timer started, every {:?}", period);
        
        state.task = Some(smol::spawn(async move {
            let mut ticks = smol::Timer::interval(period);
            while ticks.next().await.is_some() {
                callback();
            }
        }));
        
        self
    }
    
    pub fn stop(&self) -> &Self {
        if self.lock().task.take().is_some() {
            tracing::debug!("Timer stopped");
        }
        self
    }
    
    pub fn is_running(&self) -> bool {
        self.lock().task.is_some()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Hands out timers, sharing the ones asked for by key
#[derive(Default)]
pub struct TimerRegistry {
    timers: Mutex<HashMap<String, Arc<Timer>>>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Get the timer for `key`, or a fresh unshared timer for `None`
    pub fn timer(&self, key: Option<&str>) -> Arc<Timer> {
        let Some(key) = key else {
            return Arc::new(Timer::new());
        };
        
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.to_string())
            .or_default()
            .clone()
    }
    
    /// Stop every keyed timer
    pub fn stop_all(&self) {
        for timer in self.timers.lock().unwrap_or_else(PoisonError::into_inner).values() {
            timer.stop();
        }
    }
    
    pub fn len(&self) -> usize {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    
    #[test]
    fn test_registry_shares_keyed_timers() {
        let registry = TimerRegistry::new();
        
        let a = registry.timer(Some("clock"));
        let b = registry.timer(Some("clock"));
        let c = registry.timer(None);
        
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.len(), 1);
    }
    
    #[test]
    fn test_interval_clamped() {
        let timer = Timer::new();
        timer.set_interval(Duration::ZERO);
        assert_eq!(timer.interval(), MIN_INTERVAL);
    }
    
    #[test]
    fn test_start_and_stop() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let timer = Timer::new();
        
        let t = ticks.clone();
        timer.set_callback(move || { t.fetch_add(1, Ordering::SeqCst); });
        timer.start(Some(Duration::from_millis(5)));
        assert!(timer.is_running());
        
        smol::block_on(smol::Timer::after(Duration::from_millis(100)));
        timer.stop();
        assert!(!timer.is_running());
        
        // A tick may still be finishing on an executor thread
        smol::block_on(smol::Timer::after(Duration::from_millis(20)));
        let after_stop = ticks.load(Ordering::SeqCst);
        assert!(after_stop >= 2, "Expected at least 2 ticks, got {}", after_stop);
        
        smol::block_on(smol::Timer::after(Duration::from_millis(30)));
        assert_eq!(ticks.load(Ordering::SeqCst), after_stop);
    }
}
