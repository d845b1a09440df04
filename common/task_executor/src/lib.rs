mod metrics;
pub mod test_utils;

use futures::future::Future;
use tokio::runtime::Handle;
use tracing::{debug, trace};

pub use tokio::task::JoinHandle;

/// A wrapper over a runtime handle which can spawn async and blocking tasks.
///
/// Tasks are labelled for metrics, and all async tasks race the global `exit`
/// channel so that they terminate promptly on shutdown.
#[derive(Clone)]
pub struct TaskExecutor {
    /// The handle to the runtime on which tasks are dispatched.
    handle: Handle,
    /// The receiver exit future which on receiving shuts down the task.
    exit: async_channel::Receiver<()>,
}

impl TaskExecutor {
    /// Create a new task executor.
    ///
    /// Note: this function should only be used during testing. In production, the
    /// `TaskExecutor` should be created by the node's runtime builder, so that all
    /// tasks share the one exit channel.
    pub fn new(handle: Handle, exit: async_channel::Receiver<()>) -> Self {
        Self { handle, exit }
    }

    /// Spawn a future on the tokio runtime.
    ///
    /// The future is wrapped in an `async-channel::Receiver`. The task should exit gracefully
    /// when the corresponding sender is dropped or sent to.
    ///
    /// This function generates prometheus metrics on number of tasks and task duration.
    pub fn spawn(&self, task: impl Future<Output = ()> + Send + 'static, name: &'static str) {
        if let Some(task_handle) = self.spawn_handle(task, name) {
            drop(task_handle)
        }
    }

    /// Spawn a future, returning a handle to it, or `None` if the task metric could not be
    /// created.
    ///
    /// The task is cancelled (and its handle resolves to `None`) if the exit channel fires
    /// before the future completes.
    pub fn spawn_handle<R: Send + 'static>(
        &self,
        task: impl Future<Output = R> + Send + 'static,
        name: &'static str,
    ) -> Option<JoinHandle<Option<R>>> {
        let exit = self.exit.clone();

        let int_gauge = metrics::get_int_gauge(&metrics::ASYNC_TASKS_COUNT, &[name])?;
        int_gauge.inc();

        Some(self.handle.spawn(async move {
            futures::pin_mut!(task);
            let result = tokio::select! {
                result = task => {
                    trace!(task = name, "Async task completed");
                    Some(result)
                }
                _ = exit.recv() => {
                    debug!(task = name, "Async task shutdown, exit received");
                    None
                }
            };
            int_gauge.dec();
            result
        }))
    }

    /// Spawn a future on the tokio runtime. This function does not wrap the task in an exit
    /// future; the caller is responsible for termination.
    pub fn spawn_without_exit(
        &self,
        task: impl Future<Output = ()> + Send + 'static,
        name: &'static str,
    ) {
        if let Some(int_gauge) = metrics::get_int_gauge(&metrics::ASYNC_TASKS_COUNT, &[name]) {
            int_gauge.inc();
            let future = async move {
                task.await;
                int_gauge.dec();
            };
            self.handle.spawn(future);
        }
    }

    /// Spawn a future on the tokio runtime, ignoring (but logging) any error it returns.
    ///
    /// Suitable for fire-and-forget duties whose failure must never propagate.
    pub fn spawn_ignoring_error<E: std::fmt::Debug>(
        &self,
        task: impl Future<Output = Result<(), E>> + Send + 'static,
        name: &'static str,
    ) {
        self.spawn(
            async move {
                if let Err(e) = task.await {
                    debug!(task = name, error = ?e, "Async task errored");
                }
            },
            name,
        )
    }

    /// Spawn a blocking task on a dedicated tokio blocking thread.
    pub fn spawn_blocking<F>(&self, task: F, name: &'static str)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Some(int_gauge) = metrics::get_int_gauge(&metrics::BLOCKING_TASKS_COUNT, &[name]) {
            int_gauge.inc();
            let timer = metrics::start_timer_vec(&metrics::BLOCKING_TASKS_HISTOGRAM, &[name]);
            self.handle.spawn_blocking(move || {
                task();
                drop(timer);
                int_gauge.dec();
            });
        }
    }

    /// Returns a future that resolves when the exit channel fires.
    pub async fn exit(&self) {
        let exit = self.exit.clone();
        let _ = exit.recv().await;
    }

    /// Returns a handle to the runtime this executor dispatches onto.
    pub fn runtime_handle(&self) -> &Handle {
        &self.handle
    }
}
