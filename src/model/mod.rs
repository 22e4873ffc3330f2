//! # Data Model
//!
//! Read-only entities of the notification store. The engine never creates or
//! mutates these rows; ingestion happens upstream. A notification always
//! references exactly one device, and a device always references exactly one
//! network. Network membership (users ↔ networks) is reachable only through
//! the scope directory, not through these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a stored notification row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub i64);

/// Identifier of a device row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub i64);

/// Identifier of a network row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NetworkId(pub i64);

/// Identifier of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Globally-unique external device identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceGuid(pub Uuid);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DeviceGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A timestamped event published by a device
///
/// Immutable once stored. Timestamps are event time and are not required to
/// be unique, so ordering ties are broken by id where determinism matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Row identity
    pub id: NotificationId,

    /// Owning device
    pub device_id: DeviceId,

    /// Notification name (e.g. "equipment")
    pub name: String,

    /// Event time
    pub timestamp: DateTime<Utc>,

    /// Opaque parameter payload
    pub parameters: serde_json::Value,
}

impl Notification {
    /// Creates a notification record
    pub fn new(
        id: NotificationId,
        device_id: DeviceId,
        name: impl Into<String>,
        timestamp: DateTime<Utc>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            id,
            device_id,
            name: name.into(),
            timestamp,
            parameters,
        }
    }
}

/// A registered device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Row identity
    pub id: DeviceId,

    /// External identifier, unique across the platform
    pub guid: DeviceGuid,

    /// Owning network
    pub network_id: NetworkId,
}

impl Device {
    /// Creates a device record
    pub fn new(id: DeviceId, guid: DeviceGuid, network_id: NetworkId) -> Self {
        Self {
            id,
            guid,
            network_id,
        }
    }
}
