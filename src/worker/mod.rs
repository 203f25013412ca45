use crate::error::{MvcError, Result};
use rayon::ThreadPool;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Shared thread pool that runs controller actions and view rendering
/// off the request-accepting tasks.
#[derive(Clone)]
pub struct WorkerPool {
    pool: Arc<ThreadPool>,
}

impl WorkerPool {
    pub fn new(num_threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("simplemvc-worker-{i}"))
            .build()
            .map_err(|e| MvcError::Internal(format!("failed to start worker pool: {e}")))?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Sized to the number of logical CPUs.
    pub fn with_default_size() -> Result<Self> {
        Self::new(num_cpus::get())
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run a blocking task in the pool and await its result.
    ///
    /// A panic inside `f` is caught and reported as [`MvcError::ActionPanicked`].
    pub async fn execute<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.pool.spawn(move || {
            let result = catch_unwind(AssertUnwindSafe(f));
            let _ = tx.send(result);
        });

        match rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => Err(MvcError::ActionPanicked(panic_message(payload.as_ref()))),
            Err(_) => Err(MvcError::Internal("worker pool dropped the task".to_string())),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_returns_value() {
        let pool = WorkerPool::new(2).unwrap();
        assert_eq!(pool.execute(|| 21 * 2).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_execute_runs_off_the_runtime_thread() {
        let pool = WorkerPool::new(1).unwrap();
        let name = pool
            .execute(|| std::thread::current().name().map(str::to_string))
            .await
            .unwrap();
        assert_eq!(name.as_deref(), Some("simplemvc-worker-0"));
    }

    #[tokio::test]
    async fn test_execute_catches_panics() {
        let pool = WorkerPool::new(1).unwrap();
        let err = pool.execute(|| -> u8 { panic!("kaboom") }).await.unwrap_err();
        match err {
            MvcError::ActionPanicked(msg) => assert_eq!(msg, "kaboom"),
            other => panic!("unexpected error: {other}"),
        }
        // the pool keeps working after a panic
        assert_eq!(pool.execute(|| 1).await.unwrap(), 1);
    }
}
