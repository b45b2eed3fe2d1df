use thiserror::Error;

use crate::ContainerId;

/// Errors reported by a push client or its factory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("invalid client configuration: {0}")]
    InvalidConfiguration(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("client is closed")]
    Closed,
}

/// Errors reported by the container registry and the owning application.
#[derive(Debug, PartialEq, Error)]
pub enum RegistryError {
    /// The client library rejected the configuration; nothing was installed.
    #[error("failed to build client for container `{id}`")]
    Construction {
        id: ContainerId,
        #[source]
        source: ClientError,
    },

    #[error("container registry has been shut down")]
    ShutDown,

    #[error("container `{id}` has already been shut down")]
    ContainerAlreadyShutDown { id: ContainerId },

    #[error("application has been shut down")]
    ApplicationShutDown,

    #[error("no tokio runtime is available to bind an execution context")]
    NoRuntime,

    #[error("background task failed: {0}")]
    BackgroundTask(String),
}
