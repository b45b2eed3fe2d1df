//! # APNs Registry
//!
//! A registry of named push notification client containers for an application.
//!
//! Each container pairs one client with the configuration used to build it (its
//! credentials and gateway environment). The registry keeps them under
//! [`ContainerId`]s and makes exactly one of them the default, so code that only
//! needs one client can ask for "the client" without naming it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use apns_registry::{Application, AuthenticationMethod, ClientFactory, Notification};
//!
//! # async fn demo(factory: Arc<dyn ClientFactory>) -> Result<(), Box<dyn std::error::Error>> {
//! let app = Application::new(factory)?;
//!
//! // Production and development clients sharing one signing key.
//! app.apns()
//!     .configure(AuthenticationMethod::jwt(
//!         std::env::var("APNS_KEY_P8")?,
//!         "9UC9ZLQ8YW",
//!         "ABBM6U9RM5",
//!     ))
//!     .await?;
//!
//! let notification = Notification::new("98AAD4A2398DDC58", serde_json::json!({ "aps": {} }));
//! app.apns().client().await.send(&notification).await?;
//!
//! app.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Lazy**: an application's registry is created on first access, exactly once
//! - **Identity-stable**: lookups hand out the same `Arc<Container>` until it is replaced
//! - **Shutdown-aware**: replaced clients and, at teardown, all clients are shut down once
//! - **Tracing support**: `tracing` logs plus an optional [`RegistryEvent`] callback
//!
//! ## Main Types
//!
//! - [`Containers`] - the registry: `register`, `get`, `get_default`, `shutdown`
//! - [`Container`] - one client plus its [`ClientConfiguration`]
//! - [`Application`] - owns the registry and tears it down
//! - [`Apns`] - lazy accessor with `client()` / `client_for(id)`
//! - [`Request`] - request-scoped view forwarding to the application

mod application;
mod client;
mod config;
mod container;
mod context;
mod facade;
mod id;
mod registry;
mod registry_error;
mod registry_event;
mod request;
mod storage;

#[cfg(test)]
mod test_support;

pub use application::{Application, Locks};
pub use client::{ClientFactory, Notification, NotificationResponse, PushClient};
pub use config::{AuthenticationMethod, ClientConfiguration, Environment};
pub use container::Container;
pub use context::ExecutionContext;
pub use facade::Apns;
pub use id::ContainerId;
pub use registry::{Containers, TraceCallback};
pub use registry_error::{ClientError, RegistryError};
pub use registry_event::RegistryEvent;
pub use request::Request;
pub use storage::{Storage, StorageKey};
