use std::sync::Arc;

use crate::{Apns, Application};

/// Request-scoped view of an application.
///
/// Carries no push state of its own: [`Request::apns`] forwards to the owning
/// application's accessor, so every request sees the same registry.
#[derive(Debug, Clone)]
pub struct Request {
    application: Arc<Application>,
}

impl Request {
    pub fn new(application: Arc<Application>) -> Self {
        Self { application }
    }

    pub fn application(&self) -> &Arc<Application> {
        &self.application
    }

    pub fn apns(&self) -> Apns<'_> {
        self.application.apns()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{configuration, RecordingFactory};
    use crate::{ContainerId, Environment, RegistryError};

    #[tokio::test]
    async fn test_request_forwards_to_application() -> Result<(), RegistryError> {
        let app = Arc::new(Application::new(RecordingFactory::new())?);
        let request = Request::new(app.clone());

        let from_app = app.apns().containers().await?;
        let from_request = request.apns().containers().await?;
        assert!(Arc::ptr_eq(&from_app, &from_request));

        from_app
            .register_as(configuration(Environment::Development), app.context(), ContainerId::DEFAULT)
            .await?;
        let client = request.apns().client().await;
        assert!(Arc::ptr_eq(
            &client,
            from_app.get_default().unwrap().client()
        ));

        Ok(())
    }
}
