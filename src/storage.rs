//! Type-keyed storage slots with async teardown hooks.
//!
//! Each slot is addressed by a [`StorageKey`] type and holds one `Arc` of the key's
//! associated `Value`. Values are stored type-erased (`Arc<dyn Any + Send + Sync>`)
//! and downcast on the way out, so a key can only ever yield its own value type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::debug;

use crate::{ExecutionContext, RegistryError};

/// Names a storage slot and the type stored in it.
///
/// Keys are usually zero-sized marker types:
///
/// ```rust
/// use apns_registry::StorageKey;
///
/// struct GreetingKey;
///
/// impl StorageKey for GreetingKey {
///     type Value = String;
/// }
/// ```
pub trait StorageKey: 'static {
    type Value: Send + Sync + 'static;
}

type ShutdownHook = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

struct Slot {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    /// Insertion order, used to tear slots down last-in first-out.
    order: u64,
    on_shutdown: Option<ShutdownHook>,
}

#[derive(Default)]
struct Slots {
    entries: HashMap<TypeId, Slot>,
    next_order: u64,
}

/// Storage owned by an [`Application`](crate::Application).
#[derive(Default)]
pub struct Storage {
    slots: Mutex<Slots>,
    closed: AtomicBool,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// The value stored under `K`, if any.
    pub fn get<K: StorageKey>(&self) -> Option<Arc<K::Value>> {
        let value = self
            .slots()
            .entries
            .get(&TypeId::of::<K>())
            .map(|slot| Arc::clone(&slot.value))?;

        // The slot for `K` is only ever written with a `K::Value`.
        value.downcast::<K::Value>().ok()
    }

    pub fn contains<K: StorageKey>(&self) -> bool {
        self.slots().entries.contains_key(&TypeId::of::<K>())
    }

    /// Store `value` under `K` without a teardown hook.
    pub async fn set<K: StorageKey>(&self, value: Arc<K::Value>) -> Result<(), RegistryError> {
        self.insert::<K>(value, None).await
    }

    /// Store `value` under `K` and run `on_shutdown` with it when the storage is torn down.
    ///
    /// A value already stored under `K` is replaced and its own hook runs first.
    ///
    /// # Errors
    ///
    /// [`RegistryError::ApplicationShutDown`] once [`shutdown`](Self::shutdown) has begun.
    pub async fn set_with_async_shutdown<K, F, Fut>(
        &self,
        value: Arc<K::Value>,
        on_shutdown: F,
    ) -> Result<(), RegistryError>
    where
        K: StorageKey,
        F: FnOnce(Arc<K::Value>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let captured = Arc::clone(&value);
        let hook: ShutdownHook = Box::new(move || on_shutdown(captured).boxed());
        self.insert::<K>(value, Some(hook)).await
    }

    async fn insert<K: StorageKey>(
        &self,
        value: Arc<K::Value>,
        on_shutdown: Option<ShutdownHook>,
    ) -> Result<(), RegistryError> {
        let previous = {
            let mut slots = self.slots();
            if self.closed.load(Ordering::Acquire) {
                return Err(RegistryError::ApplicationShutDown);
            }
            let order = slots.next_order;
            slots.next_order += 1;
            slots.entries.insert(
                TypeId::of::<K>(),
                Slot {
                    value,
                    type_name: std::any::type_name::<K>(),
                    order,
                    on_shutdown,
                },
            )
        };

        if let Some(Slot {
            type_name,
            on_shutdown: Some(hook),
            ..
        }) = previous
        {
            debug!(key = type_name, "running teardown hook of replaced storage value");
            hook().await;
        }

        Ok(())
    }

    /// Close the storage and run every teardown hook, most recently stored first.
    ///
    /// Values without a hook are simply dropped. The hooks run in order on a
    /// spawned task, so the sequence completes even if this call is cancelled.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::ApplicationShutDown`] if the storage was already closed.
    /// - [`RegistryError::NoRuntime`] when called outside a tokio runtime. The
    ///   storage stays open.
    /// - [`RegistryError::BackgroundTask`] if a hook panicked.
    pub async fn shutdown(&self) -> Result<(), RegistryError> {
        let context = ExecutionContext::current()?;

        let mut drained: Vec<Slot> = {
            let mut slots = self.slots();
            if self.closed.swap(true, Ordering::AcqRel) {
                return Err(RegistryError::ApplicationShutDown);
            }
            slots.entries.drain().map(|(_, slot)| slot).collect()
        };
        drained.sort_by(|a, b| b.order.cmp(&a.order));

        let hooks: Vec<(&'static str, ShutdownHook)> = drained
            .into_iter()
            .filter_map(|Slot { type_name, on_shutdown, .. }| Some((type_name, on_shutdown?)))
            .collect();

        let task = context.spawn(async move {
            for (key, hook) in hooks {
                debug!(key, "running storage teardown hook");
                hook().await;
            }
        });
        task.await
            .map_err(|err| RegistryError::BackgroundTask(err.to_string()))
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
