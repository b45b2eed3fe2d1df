//! The owning application.
//!
//! An `Application` is the lifetime the push client registry is attached to. It
//! provides the two primitives the facade needs: type-keyed [`Storage`] with async
//! teardown hooks, and named [`Locks`]. It also carries the client factory and the
//! execution context clients are bound to. Dropping the registry is never implicit:
//! [`Application::shutdown`] runs every teardown hook to completion.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::{Apns, ClientFactory, ExecutionContext, RegistryError, Storage, StorageKey};

/// Named async locks, one per [`StorageKey`].
#[derive(Default)]
pub struct Locks {
    locks: Mutex<HashMap<TypeId, Arc<tokio::sync::Mutex<()>>>>,
}

impl Locks {
    /// The lock for `K`. Every call for the same key returns the same lock.
    pub fn lock_for<K: StorageKey>(&self) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
        Arc::clone(locks.entry(TypeId::of::<K>()).or_default())
    }
}

pub struct Application {
    storage: Storage,
    locks: Locks,
    factory: Arc<dyn ClientFactory>,
    context: ExecutionContext,
}

impl Application {
    /// Create an application bound to the runtime of the calling task.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NoRuntime`] when called outside a tokio runtime.
    pub fn new(factory: Arc<dyn ClientFactory>) -> Result<Self, RegistryError> {
        Ok(Self::with_context(factory, ExecutionContext::current()?))
    }

    pub fn with_context(factory: Arc<dyn ClientFactory>, context: ExecutionContext) -> Self {
        Self {
            storage: Storage::new(),
            locks: Locks::default(),
            factory,
            context,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn locks(&self) -> &Locks {
        &self.locks
    }

    pub fn client_factory(&self) -> &Arc<dyn ClientFactory> {
        &self.factory
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Push client accessor for this application.
    pub fn apns(&self) -> Apns<'_> {
        Apns::new(self)
    }

    pub fn is_shut_down(&self) -> bool {
        self.storage.is_closed()
    }

    /// Tear the application down, awaiting every storage teardown hook.
    ///
    /// # Errors
    ///
    /// [`RegistryError::ApplicationShutDown`] if it was already torn down.
    pub async fn shutdown(&self) -> Result<(), RegistryError> {
        info!("shutting down application");
        self.storage.shutdown().await?;
        info!("application shut down");
        Ok(())
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("context", &self.context)
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}
