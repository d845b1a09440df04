use crate::TaskExecutor;
use tokio::runtime::Handle;

/// Whilst the `TestRuntime` is not necessarily useful in itself, it provides the necessary
/// components for creating a `TaskExecutor` during tests.
///
/// May only be used from within an existing tokio runtime (e.g. a `#[tokio::test]`).
pub struct TestRuntime {
    /// Sender half of the exit channel; dropping it shuts down all spawned tasks.
    _exit_tx: async_channel::Sender<()>,
    pub task_executor: TaskExecutor,
}

impl Default for TestRuntime {
    fn default() -> Self {
        let (exit_tx, exit_rx) = async_channel::bounded(1);
        let task_executor = TaskExecutor::new(Handle::current(), exit_rx);

        Self {
            _exit_tx: exit_tx,
            task_executor,
        }
    }
}
