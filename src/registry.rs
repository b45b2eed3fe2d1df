//! The container registry.
//!
//! `Containers` maps [`ContainerId`]s to [`Container`]s and tracks which id is the
//! default. It is safe to share across tasks: mutations (`register`, `shutdown`) are
//! serialized behind one async mutex, while lookups read a consistent snapshot of the
//! map without waiting on client construction.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use apns_registry::*;
//! # async fn demo(factory: Arc<dyn ClientFactory>, config: ClientConfiguration) -> Result<(), RegistryError> {
//! let containers = Containers::new(factory);
//! let context = ExecutionContext::current()?;
//!
//! containers
//!     .register(config, &context, ContainerId::DEFAULT, false)
//!     .await?;
//!
//! let default = containers.get_default().expect("registered above");
//! assert!(Arc::ptr_eq(&default, &containers.get(&ContainerId::DEFAULT).unwrap()));
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::{
    ClientConfiguration, ClientFactory, Container, ContainerId, ExecutionContext, RegistryError,
    RegistryEvent,
};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `RegistryEvent` every time the registry is
/// interacted with. It must be thread-safe because the registry itself is shared.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

#[derive(Default)]
struct State {
    entries: HashMap<ContainerId, Arc<Container>>,
    /// Names a key in `entries`, or is `None` while `entries` is empty.
    default_id: Option<ContainerId>,
    shut_down: bool,
}

/// Keyed collection of containers plus the current default id.
pub struct Containers {
    factory: Arc<dyn ClientFactory>,
    state: RwLock<State>,
    /// Serializes `register` and `shutdown`. Held across client construction.
    mutation: tokio::sync::Mutex<()>,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

impl Containers {
    /// Create an empty registry that builds clients with `factory`.
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            factory,
            state: RwLock::new(State::default()),
            mutation: tokio::sync::Mutex::new(()),
            trace: Mutex::new(None),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Tracing
    // ---------------------------------------------------------------------------------------------

    /// Set a tracing callback for registry operations.
    ///
    /// The callback is invoked for `register`, `get` and `shutdown`, and for
    /// `get_default` once a default id is set.
    /// It runs after the registry has released its state lock, so it may call back
    /// into the registry.
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    pub fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    fn emit_event(&self, event: &RegistryEvent) {
        let callback = self
            .trace
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Registry
    // ---------------------------------------------------------------------------------------------

    // Lock poisoning only happens if a thread panics while holding the lock; every
    // write below leaves the state consistent before it can panic.
    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(|p| p.into_inner())
    }

    /// Build a client from `configuration` and install it under `id`.
    ///
    /// The default pointer moves to `id` when `is_default` is true, when `id` is
    /// [`ContainerId::DEFAULT`], or when no default has been set yet. A container
    /// previously stored under `id` is replaced and shut down exactly once; that
    /// shutdown runs on `context` and completes even if this call is cancelled.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Construction`] if the factory rejects the configuration.
    ///   Nothing is installed.
    /// - [`RegistryError::ShutDown`] if the registry has already been shut down.
    pub async fn register(
        &self,
        configuration: ClientConfiguration,
        context: &ExecutionContext,
        id: ContainerId,
        is_default: bool,
    ) -> Result<Arc<Container>, RegistryError> {
        let _mutation = self.mutation.lock().await;

        let shut_down = self.read().shut_down;
        if shut_down {
            return Err(RegistryError::ShutDown);
        }

        let client = self
            .factory
            .build(&configuration, context)
            .await
            .map_err(|source| {
                warn!(id = %id, error = %source, "push client construction failed");
                RegistryError::Construction {
                    id: id.clone(),
                    source,
                }
            })?;
        let container = Arc::new(Container::new(id.clone(), configuration, client));

        // No await point between here and the end of the block: the entry and the
        // default pointer change together or not at all.
        let (replaced, default) = {
            let mut state = self.write();
            let replaced = state.entries.insert(id.clone(), Arc::clone(&container));
            if is_default || id.is_default() || state.default_id.is_none() {
                state.default_id = Some(id.clone());
            }
            (replaced, state.default_id.as_ref() == Some(&id))
        };

        info!(
            id = %id,
            sequence = container.sequence(),
            environment = container.configuration().environment.url(),
            is_default = default,
            replaced = replaced.is_some(),
            "registered push client container"
        );
        self.emit_event(&RegistryEvent::Register {
            id: id.clone(),
            replaced: replaced.is_some(),
            default,
        });

        if let Some(previous) = replaced {
            debug!(id = %id, sequence = previous.sequence(), "shutting down replaced container");
            let task = context.spawn(async move { previous.shutdown().await });
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(id = %id, error = %err, "replaced container was not shut down"),
                Err(err) => warn!(id = %id, error = %err, "replaced container shutdown task failed"),
            }
        }

        Ok(container)
    }

    /// Same as [`register`](Self::register) with `is_default` set to `false`.
    ///
    /// The id still becomes the default if it is [`ContainerId::DEFAULT`] or if it
    /// is the first one registered.
    pub async fn register_as(
        &self,
        configuration: ClientConfiguration,
        context: &ExecutionContext,
        id: ContainerId,
    ) -> Result<Arc<Container>, RegistryError> {
        self.register(configuration, context, id, false).await
    }

    /// The container stored under `id`, if any.
    pub fn get(&self, id: &ContainerId) -> Option<Arc<Container>> {
        let found = self.read().entries.get(id).cloned();

        self.emit_event(&RegistryEvent::Get {
            id: id.clone(),
            found: found.is_some(),
        });

        found
    }

    /// The container at the current default id, if any.
    ///
    /// Emits no trace event while no default is set.
    pub fn get_default(&self) -> Option<Arc<Container>> {
        let (id, found) = {
            let state = self.read();
            let Some(id) = state.default_id.clone() else {
                return None;
            };
            let found = state.entries.get(&id).cloned();
            (id, found)
        };

        self.emit_event(&RegistryEvent::Get {
            id,
            found: found.is_some(),
        });

        found
    }

    pub fn contains(&self, id: &ContainerId) -> bool {
        self.read().entries.contains_key(id)
    }

    pub fn default_id(&self) -> Option<ContainerId> {
        self.read().default_id.clone()
    }

    /// Registered ids, in no particular order.
    pub fn ids(&self) -> Vec<ContainerId> {
        self.read().entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    pub fn is_shut_down(&self) -> bool {
        self.read().shut_down
    }

    /// Shut down every held container exactly once and empty the registry.
    ///
    /// Lookups return `None` from the moment the entries are taken out. Client
    /// failures are logged and do not prevent the remaining shutdowns. The client
    /// shutdowns run on a spawned task, so they complete even if this call is
    /// cancelled.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::ShutDown`] if the registry was already shut down.
    /// - [`RegistryError::NoRuntime`] when called outside a tokio runtime. The
    ///   registry is left untouched.
    pub async fn shutdown(&self) -> Result<(), RegistryError> {
        let context = ExecutionContext::current()?;
        let _mutation = self.mutation.lock().await;

        let drained: Vec<Arc<Container>> = {
            let mut state = self.write();
            if state.shut_down {
                return Err(RegistryError::ShutDown);
            }
            state.shut_down = true;
            state.default_id = None;
            state.entries.drain().map(|(_, container)| container).collect()
        };

        let count = drained.len();
        let task = context.spawn(async move {
            for result in join_all(drained.iter().map(|container| container.shutdown())).await {
                if let Err(err) = result {
                    warn!(error = %err, "container was not shut down");
                }
            }
        });
        if let Err(err) = task.await {
            warn!(error = %err, "container shutdown task failed");
        }

        info!(containers = count, "container registry shut down");
        self.emit_event(&RegistryEvent::Shutdown { containers: count });

        Ok(())
    }
}

impl fmt::Debug for Containers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("Containers")
            .field("ids", &state.entries.keys().collect::<Vec<_>>())
            .field("default_id", &state.default_id)
            .field("shut_down", &state.shut_down)
            .finish_non_exhaustive()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
