//! Application-scoped accessor for the push client registry.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    Application, AuthenticationMethod, ClientConfiguration, ContainerId, Containers, Environment,
    PushClient, RegistryError, StorageKey,
};

/// Storage slot (and lock name) for an application's registry.
struct ContainersKey;

impl StorageKey for ContainersKey {
    type Value = Containers;
}

/// Push client accessor, borrowed from an [`Application`].
///
/// `Apns` holds no state; every call goes to the registry stored in the application.
#[derive(Debug, Clone, Copy)]
pub struct Apns<'a> {
    application: &'a Application,
}

impl<'a> Apns<'a> {
    pub fn new(application: &'a Application) -> Self {
        Self { application }
    }

    /// The application's registry, created on first access.
    ///
    /// Creation happens at most once per application even under concurrent first
    /// access: the storage is checked, then re-checked under the application's lock
    /// for the registry key before a new registry is published. Publishing also
    /// registers a teardown hook so [`Application::shutdown`] shuts the registry down.
    ///
    /// # Errors
    ///
    /// [`RegistryError::ApplicationShutDown`] once the application has been torn down.
    pub async fn containers(&self) -> Result<Arc<Containers>, RegistryError> {
        let storage = self.application.storage();
        if storage.is_closed() {
            return Err(RegistryError::ApplicationShutDown);
        }
        if let Some(existing) = storage.get::<ContainersKey>() {
            return Ok(existing);
        }

        let lock = self.application.locks().lock_for::<ContainersKey>();
        let _guard = lock.lock().await;

        if let Some(existing) = storage.get::<ContainersKey>() {
            return Ok(existing);
        }

        let containers = Arc::new(Containers::new(Arc::clone(
            self.application.client_factory(),
        )));
        storage
            .set_with_async_shutdown::<ContainersKey, _, _>(
                Arc::clone(&containers),
                |containers| async move {
                    if let Err(err) = containers.shutdown().await {
                        warn!(error = %err, "push client registry teardown failed");
                    }
                },
            )
            .await?;
        debug!("created push client registry");

        Ok(containers)
    }

    /// The default container's client.
    ///
    /// # Panics
    ///
    /// If no default container is configured, or the application has been torn
    /// down. Both mean the application was deployed without push configuration.
    pub async fn client(&self) -> Arc<dyn PushClient> {
        let containers = match self.containers().await {
            Ok(containers) => containers,
            Err(err) => panic!("APNS registry unavailable: {err}"),
        };
        match containers.get_default() {
            Some(container) => Arc::clone(container.client()),
            None => panic!("No default APNS container configured."),
        }
    }

    /// The client registered under `id`.
    ///
    /// # Panics
    ///
    /// If nothing is registered under `id`, or the application has been torn down.
    pub async fn client_for(&self, id: &ContainerId) -> Arc<dyn PushClient> {
        let containers = match self.containers().await {
            Ok(containers) => containers,
            Err(err) => panic!("APNS registry unavailable: {err}"),
        };
        match containers.get(id) {
            Some(container) => Arc::clone(container.client()),
            None => panic!("No APNS container for {id}."),
        }
    }

    /// Register a production and a development client sharing `authentication`.
    ///
    /// The clients are available through [`client_for`](Self::client_for) with
    /// [`ContainerId::PRODUCTION`] and [`ContainerId::DEVELOPMENT`], which makes it
    /// easy to serve both release and development builds of an app. Production is
    /// registered first, so it becomes the default unless a default already exists.
    ///
    /// The same key can be used for both environments.
    pub async fn configure(
        &self,
        authentication: AuthenticationMethod,
    ) -> Result<(), RegistryError> {
        let containers = self.containers().await?;
        let context = self.application.context();

        containers
            .register_as(
                ClientConfiguration::new(authentication.clone(), Environment::Production),
                context,
                ContainerId::PRODUCTION,
            )
            .await?;
        containers
            .register_as(
                ClientConfiguration::new(authentication, Environment::Development),
                context,
                ContainerId::DEVELOPMENT,
            )
            .await?;

        Ok(())
    }
}
