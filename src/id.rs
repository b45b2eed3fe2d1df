//! Container identifiers.
//!
//! A `ContainerId` is an opaque, value-comparable key used to look up a container in
//! the registry. Three well-known identifiers are provided as constants; any other
//! string can be turned into an identifier with [`ContainerId::new`] or `From`.

use std::borrow::Cow;
use std::fmt;

/// Key under which a container is stored in the registry.
///
/// Equality and hashing are by the underlying string value.
///
/// # Examples
///
/// ```rust
/// use apns_registry::ContainerId;
///
/// const CUSTOM: ContainerId = ContainerId::from_static("custom");
///
/// assert_eq!(CUSTOM, ContainerId::new("custom"));
/// assert_ne!(CUSTOM, ContainerId::DEFAULT);
/// assert!(ContainerId::from("default").is_default());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(Cow<'static, str>);

impl ContainerId {
    /// The sentinel identifier. Registering under it always claims the default slot.
    pub const DEFAULT: ContainerId = ContainerId::from_static("default");

    /// Conventional identifier for the production gateway.
    pub const PRODUCTION: ContainerId = ContainerId::from_static("production");

    /// Conventional identifier for the sandbox gateway.
    pub const DEVELOPMENT: ContainerId = ContainerId::from_static("development");

    /// Build an identifier from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    /// Build an identifier from a string literal, usable in `const` items.
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the [`ContainerId::DEFAULT`] sentinel.
    pub fn is_default(&self) -> bool {
        self.as_str() == Self::DEFAULT.as_str()
    }
}

impl Default for ContainerId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ContainerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ContainerId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl AsRef<str> for ContainerId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
