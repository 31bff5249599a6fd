use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Default settle time for search input.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(250);

type Callback<T> = Arc<dyn Fn(T) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Delays an async callback until calls stop arriving for `delay`.
///
/// Every [`call`](Debouncer::call) aborts the pending timer, if any, and
/// starts a new one, so only the latest value within the window is
/// delivered. A callback that has already started is never cancelled.
///
/// Must be used from within a Tokio runtime.
pub struct Debouncer<T> {
    delay: Duration,
    callback: Callback<T>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(delay: Duration, callback: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let callback: Callback<T> =
            Arc::new(move |value: T| -> Pin<Box<dyn Future<Output = ()> + Send>> {
                Box::pin(callback(value))
            });
        Self {
            delay,
            callback,
            pending: Mutex::new(None),
        }
    }

    /// Schedule `value` for delivery after the delay, replacing any pending value.
    pub fn call(&self, value: T) {
        let callback = Arc::clone(&self.callback);
        let delay = self.delay;

        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached: aborting the timer must not abort a running callback.
            tokio::spawn(callback(value));
        });

        if let Some(previous) = self.pending().replace(timer) {
            previous.abort();
        }
    }

    /// Drop the pending value without delivering it.
    pub fn cancel(&self) {
        if let Some(previous) = self.pending().take() {
            previous.abort();
        }
    }

    /// True while a value is waiting for its timer.
    pub fn is_pending(&self) -> bool {
        self.pending()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_debouncer() -> (Debouncer<u32>, Arc<Mutex<Vec<u32>>>) {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&fired);
        let debouncer = Debouncer::new(DEFAULT_DELAY, move |value: u32| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(value);
            }
        });
        (debouncer, fired)
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_call_fires() {
        let (debouncer, fired) = recording_debouncer();

        debouncer.call(1);
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.call(2);
        tokio::time::sleep(Duration::from_millis(200)).await;
        debouncer.call(3);
        assert!(fired.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(300)).await;
        tokio::task::yield_now().await;
        assert_eq!(*fired.lock().unwrap(), vec![3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_calls_all_fire() {
        let (debouncer, fired) = recording_debouncer();

        debouncer.call(1);
        tokio::time::sleep(Duration::from_millis(300)).await;
        debouncer.call(2);
        tokio::time::sleep(Duration::from_millis(300)).await;
        tokio::task::yield_now().await;

        assert_eq!(*fired.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending() {
        let (debouncer, fired) = recording_debouncer();

        debouncer.call(1);
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(fired.lock().unwrap().is_empty());
    }
}
