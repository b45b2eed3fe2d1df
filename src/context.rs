//! Executor binding for clients.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::RegistryError;

/// The runtime a client is built on and that registry background work runs on.
///
/// Cloning is cheap; all clones refer to the same runtime.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    handle: Handle,
}

impl ExecutionContext {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime of the calling task.
    pub fn current() -> Result<Self, RegistryError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| RegistryError::NoRuntime)
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Spawn a task on the bound runtime.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }
}

impl From<Handle> for ExecutionContext {
    fn from(handle: Handle) -> Self {
        Self::new(handle)
    }
}
