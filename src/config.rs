//! Client configuration values.
//!
//! A [`ClientConfiguration`] describes how to build one push client: how it
//! authenticates, which gateway it talks to, and how long a request may take.
//! The registry treats it as opaque input to the [`ClientFactory`](crate::ClientFactory);
//! the structural checks in [`ClientConfiguration::validate`] are offered for
//! factories that want to reject obviously malformed values early.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ClientError;

const PRODUCTION_URL: &str = "https://api.push.apple.com";
const DEVELOPMENT_URL: &str = "https://api.sandbox.push.apple.com";
const PEM_HEADER: &str = "-----BEGIN";

/// How a client proves its identity to the gateway.
///
/// Secrets are never printed by the `Debug` implementation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AuthenticationMethod {
    /// Token based authentication with a `.p8` signing key.
    Jwt {
        /// PEM encoded EC private key.
        private_key: String,
        /// Key identifier from the developer portal.
        key_identifier: String,
        /// Team identifier from the developer portal.
        team_identifier: String,
    },
    /// Certificate based authentication.
    Tls {
        /// PEM encoded certificate chain.
        certificate_chain: String,
        /// PEM encoded private key for the leaf certificate.
        private_key: String,
    },
}

impl AuthenticationMethod {
    /// Convenience constructor for [`AuthenticationMethod::Jwt`].
    pub fn jwt(
        private_key: impl Into<String>,
        key_identifier: impl Into<String>,
        team_identifier: impl Into<String>,
    ) -> Self {
        Self::Jwt {
            private_key: private_key.into(),
            key_identifier: key_identifier.into(),
            team_identifier: team_identifier.into(),
        }
    }

    fn validate(&self) -> Result<(), ClientError> {
        match self {
            AuthenticationMethod::Jwt {
                private_key,
                key_identifier,
                team_identifier,
            } => {
                check_pem("private key", private_key)?;
                if key_identifier.trim().is_empty() {
                    return Err(ClientError::InvalidConfiguration(
                        "key identifier is empty".to_string(),
                    ));
                }
                if team_identifier.trim().is_empty() {
                    return Err(ClientError::InvalidConfiguration(
                        "team identifier is empty".to_string(),
                    ));
                }
                Ok(())
            }
            AuthenticationMethod::Tls {
                certificate_chain,
                private_key,
            } => {
                check_pem("certificate chain", certificate_chain)?;
                check_pem("private key", private_key)
            }
        }
    }
}

impl fmt::Debug for AuthenticationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthenticationMethod::Jwt {
                key_identifier,
                team_identifier,
                ..
            } => f
                .debug_struct("Jwt")
                .field("private_key", &"<redacted>")
                .field("key_identifier", key_identifier)
                .field("team_identifier", team_identifier)
                .finish(),
            AuthenticationMethod::Tls { .. } => f
                .debug_struct("Tls")
                .field("certificate_chain", &"<redacted>")
                .field("private_key", &"<redacted>")
                .finish(),
        }
    }
}

fn check_pem(what: &str, value: &str) -> Result<(), ClientError> {
    if value.trim_start().starts_with(PEM_HEADER) {
        Ok(())
    } else {
        Err(ClientError::InvalidConfiguration(format!(
            "{what} is not PEM encoded"
        )))
    }
}

/// Which push gateway a client sends to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Production,
    Development,
    /// A non-Apple endpoint, typically a local mock server.
    Custom { url: String },
}

impl Environment {
    /// Base URL of the gateway.
    pub fn url(&self) -> &str {
        match self {
            Environment::Production => PRODUCTION_URL,
            Environment::Development => DEVELOPMENT_URL,
            Environment::Custom { url } => url,
        }
    }

    pub fn custom(url: impl Into<String>) -> Self {
        Environment::Custom { url: url.into() }
    }
}

/// Immutable description of one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfiguration {
    pub authentication: AuthenticationMethod,
    pub environment: Environment,
    /// Upper bound on a single request. `None` leaves it to the client library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl ClientConfiguration {
    pub fn new(authentication: AuthenticationMethod, environment: Environment) -> Self {
        Self {
            authentication,
            environment,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Structural checks on credentials and endpoint.
    ///
    /// This does not parse keys; it only rejects values no client could use.
    pub fn validate(&self) -> Result<(), ClientError> {
        self.authentication.validate()?;

        if let Environment::Custom { url } = &self.environment {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ClientError::InvalidConfiguration(format!(
                    "custom endpoint `{url}` is not an http(s) URL"
                )));
            }
        }

        if self.timeout == Some(Duration::ZERO) {
            return Err(ClientError::InvalidConfiguration(
                "timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
