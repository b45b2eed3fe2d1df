use crate::ContainerId;

/// Events emitted by the container registry during operations.
///
/// These events are passed to the tracing callback set via
/// [`Containers::set_trace_callback`](crate::Containers::set_trace_callback).
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use apns_registry::{ContainerId, RegistryEvent};
///
/// let event = RegistryEvent::Get { id: ContainerId::DEFAULT, found: true };
/// assert_eq!(event.to_string(), "get { id: default, found: true }");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    /// A container was installed.
    Register {
        id: ContainerId,
        /// Whether an existing container under the same id was replaced
        replaced: bool,
        /// Whether the default pointer now names this id
        default: bool,
    },

    /// A container was looked up, either by id or through the default pointer.
    Get {
        id: ContainerId,
        /// Whether a container was found
        found: bool,
    },

    /// The registry was shut down.
    Shutdown {
        /// Number of containers that were shut down
        containers: usize,
    },
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEvent::Register {
                id,
                replaced,
                default,
            } => {
                write!(
                    f,
                    "register {{ id: {}, replaced: {}, default: {} }}",
                    id, replaced, default
                )
            }
            RegistryEvent::Get { id, found } => {
                write!(f, "get {{ id: {}, found: {} }}", id, found)
            }
            RegistryEvent::Shutdown { containers } => {
                write!(f, "shutdown {{ containers: {} }}", containers)
            }
        }
    }
}
