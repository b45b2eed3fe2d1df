//! The push client capability the registry manages.
//!
//! The registry never speaks the gateway protocol itself. It only needs a way to
//! build a client from a [`ClientConfiguration`] and a way to shut that client down;
//! sending is exposed so callers can use the client they look up.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ClientConfiguration, ClientError, ExecutionContext};

/// A notification addressed to one device.
///
/// The payload is passed through untouched; its shape is the client library's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub device_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub payload: serde_json::Value,
}

impl Notification {
    pub fn new(device_token: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            device_token: device_token.into(),
            topic: None,
            payload,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }
}

/// Gateway acknowledgement for a delivered notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationResponse {
    /// Identifier assigned by the gateway, if it returned one.
    pub apns_id: Option<String>,
}

/// A connected push client.
#[async_trait]
pub trait PushClient: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<NotificationResponse, ClientError>;

    /// Release connections and other resources.
    ///
    /// The registry calls this at most once per client.
    async fn shutdown(&self) -> Result<(), ClientError>;
}

/// Builds clients from configurations; stands in for the client library constructor.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn build(
        &self,
        configuration: &ClientConfiguration,
        context: &ExecutionContext,
    ) -> Result<Arc<dyn PushClient>, ClientError>;
}
