//! A single configured client.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::{ClientConfiguration, ContainerId, PushClient, RegistryError};

/// Construction sequence shared by every container in the process.
static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Pairs one client with the configuration that built it.
///
/// Containers are handed out as `Arc<Container>`; every lookup of the same entry
/// observes the same client. Two handles refer to the same container when
/// `Arc::ptr_eq` holds, or equivalently when their [`sequence`](Self::sequence)
/// numbers match.
pub struct Container {
    id: ContainerId,
    sequence: u64,
    configuration: ClientConfiguration,
    client: Arc<dyn PushClient>,
    shut_down: AtomicBool,
}

impl Container {
    pub fn new(
        id: ContainerId,
        configuration: ClientConfiguration,
        client: Arc<dyn PushClient>,
    ) -> Self {
        Self {
            id,
            sequence: NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed),
            configuration,
            client,
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &ContainerId {
        &self.id
    }

    /// Monotonically increasing construction number, unique per process.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn configuration(&self) -> &ClientConfiguration {
        &self.configuration
    }

    /// The shared client. Never copied; all callers hold the same instance.
    pub fn client(&self) -> &Arc<dyn PushClient> {
        &self.client
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Release the client's resources.
    ///
    /// Only the first call reaches the client. Later calls return
    /// [`RegistryError::ContainerAlreadyShutDown`]. A failure reported by the
    /// client itself is logged; the container still counts as shut down.
    pub async fn shutdown(&self) -> Result<(), RegistryError> {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return Err(RegistryError::ContainerAlreadyShutDown {
                id: self.id.clone(),
            });
        }

        debug!(id = %self.id, sequence = self.sequence, "shutting down push client");
        if let Err(err) = self.client.shutdown().await {
            warn!(id = %self.id, sequence = self.sequence, error = %err, "push client shutdown failed");
        }
        Ok(())
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.id)
            .field("sequence", &self.sequence)
            .field("environment", &self.configuration.environment)
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}
