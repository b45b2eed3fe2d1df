//! Integration tests for registering, looking up and shutting down containers.
//!
//! These mirror how an application wires clients: a `default` development client,
//! then additional clients under their own ids.

mod common;

use std::sync::Arc;

use apns_registry::{
    Application, ContainerId, Environment, ExecutionContext, Notification, RegistryError,
};
use common::{configuration, is_same_client, MockFactory};

const CUSTOM: ContainerId = ContainerId::from_static("custom");

#[tokio::test]
async fn test_default_container() -> Result<(), RegistryError> {
    let app = Application::new(MockFactory::new())?;
    let containers = app.apns().containers().await?;

    containers
        .register_as(configuration(Environment::Development), app.context(), ContainerId::DEFAULT)
        .await?;

    let default_container = containers.get_default().expect("default container");
    let by_id = containers.get(&ContainerId::DEFAULT).expect("container for default");
    assert!(Arc::ptr_eq(&default_container, &by_id));
    assert_eq!(
        default_container.configuration().environment,
        Environment::Development
    );

    let client = app.apns().client().await;
    assert!(Arc::ptr_eq(&client, default_container.client()));

    app.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_custom_container_does_not_take_default() -> Result<(), RegistryError> {
    let app = Application::new(MockFactory::new())?;
    let containers = app.apns().containers().await?;

    containers
        .register_as(configuration(Environment::Development), app.context(), ContainerId::DEFAULT)
        .await?;
    containers
        .register_as(
            configuration(Environment::custom("http://apple.com")),
            app.context(),
            CUSTOM,
        )
        .await?;

    let default_container = containers.get_default().unwrap();
    let custom = containers.get(&CUSTOM).unwrap();

    assert_eq!(default_container.id(), &ContainerId::DEFAULT);
    assert!(!Arc::ptr_eq(&default_container, &custom));
    assert_ne!(default_container.sequence(), custom.sequence());
    assert_eq!(custom.configuration().environment.url(), "http://apple.com");

    let custom_client = app.apns().client_for(&CUSTOM).await;
    assert!(Arc::ptr_eq(&custom_client, custom.client()));
    assert!(!Arc::ptr_eq(&custom_client, &app.apns().client().await));

    app.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_explicit_default_moves_default() -> Result<(), RegistryError> {
    let app = Application::new(MockFactory::new())?;
    let containers = app.apns().containers().await?;

    containers
        .register(configuration(Environment::Development), app.context(), ContainerId::DEFAULT, true)
        .await?;
    containers
        .register(
            configuration(Environment::custom("http://apple.com")),
            app.context(),
            CUSTOM,
            true,
        )
        .await?;

    let default_container = containers.get_default().unwrap();
    assert!(Arc::ptr_eq(&default_container, &containers.get(&CUSTOM).unwrap()));
    assert!(containers.get(&ContainerId::DEFAULT).is_some());

    app.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_lookups_are_identity_stable_until_replaced() -> Result<(), RegistryError> {
    let factory = MockFactory::new();
    let app = Application::new(factory.clone())?;
    let containers = app.apns().containers().await?;

    let installed = containers
        .register_as(configuration(Environment::Production), app.context(), ContainerId::PRODUCTION)
        .await?;

    for _ in 0..3 {
        let found = containers.get(&ContainerId::PRODUCTION).unwrap();
        assert!(Arc::ptr_eq(&installed, &found));
    }

    let replacement = containers
        .register_as(configuration(Environment::Development), app.context(), ContainerId::PRODUCTION)
        .await?;
    let found = containers.get(&ContainerId::PRODUCTION).unwrap();
    assert!(Arc::ptr_eq(&replacement, &found));
    assert!(!Arc::ptr_eq(&installed, &found));

    // The replaced client was shut down once and is no longer reachable.
    let built = factory.built();
    assert_eq!(built[0].shutdowns(), 1);
    assert!(is_same_client(found.client(), &built[1]));
    assert_eq!(containers.len(), 1);

    app.shutdown().await?;
    assert_eq!(built[0].shutdowns(), 1);
    assert_eq!(built[1].shutdowns(), 1);
    Ok(())
}

#[tokio::test]
async fn test_client_sends_through_registry() -> Result<(), Box<dyn std::error::Error>> {
    let factory = MockFactory::new();
    let app = Application::new(factory.clone())?;
    app.apns().configure(common::jwt()).await?;

    let notification = Notification::new(
        "98AAD4A2398DDC58595F02FA307DF9A15C18B6111D1B806949549085A8E6A55D",
        serde_json::json!({ "aps": { "alert": { "title": "Hello" } } }),
    )
    .with_topic("MY_TOPIC");

    let response = app
        .apns()
        .client_for(&ContainerId::DEVELOPMENT)
        .await
        .send(&notification)
        .await?;
    assert_eq!(response.apns_id.as_deref(), Some("mock-1"));

    let built = factory.built();
    let development = built
        .iter()
        .find(|client| client.environment == Environment::Development)
        .unwrap();
    assert_eq!(development.sent(), vec![notification]);

    app.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_registry_shutdown_releases_all_clients() -> Result<(), RegistryError> {
    let factory = MockFactory::new();
    let app = Application::new(factory.clone())?;
    let containers = app.apns().containers().await?;
    let context = ExecutionContext::current()?;

    for id in ["a", "b", "c"] {
        containers
            .register_as(configuration(Environment::Development), &context, ContainerId::new(id))
            .await?;
    }

    containers.shutdown().await?;

    assert_eq!(factory.built().len(), 3);
    assert!(factory.built().iter().all(|client| client.shutdowns() == 1));
    assert!(containers.get_default().is_none());
    for id in ["a", "b", "c"] {
        assert!(containers.get(&ContainerId::new(id)).is_none());
    }

    // Application teardown finds the registry already shut down and leaves clients alone.
    app.shutdown().await?;
    assert!(factory.built().iter().all(|client| client.shutdowns() == 1));
    Ok(())
}
