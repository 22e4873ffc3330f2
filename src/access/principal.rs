//! # Principals
//!
//! Who is asking. Every query request carries a [`Principal`]; the resolver
//! turns it into the predicate that bounds what the caller may see.

use serde::{Deserialize, Serialize};

use crate::model::{DeviceGuid, DeviceId, NetworkId, UserId};

/// The identity a request acts under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Principal {
    /// Internal caller, no visibility restriction
    #[serde(rename = "unrestricted")]
    Unrestricted,

    /// An interactive user session
    #[serde(rename = "user")]
    User(UserRef),

    /// A device acting on its own behalf
    #[serde(rename = "device")]
    Device {
        /// Device row id
        id: DeviceId,
    },

    /// An access key issued to a user, narrowed by its grants
    #[serde(rename = "access_key")]
    AccessKey {
        /// User the key was issued to
        owner: UserRef,
        /// Permission entries; a key with zero grants authorizes nothing
        grants: Vec<PermissionGrant>,
    },
}

impl Principal {
    /// Principal for trusted internal callers
    pub fn unrestricted() -> Self {
        Principal::Unrestricted
    }

    /// Principal for a user session
    pub fn user(user: UserRef) -> Self {
        Principal::User(user)
    }

    /// Principal for a device session
    pub fn device(id: DeviceId) -> Self {
        Principal::Device { id }
    }

    /// Principal for an access-key session
    pub fn access_key(owner: UserRef, grants: Vec<PermissionGrant>) -> Self {
        Principal::AccessKey { owner, grants }
    }
}

/// Reference to the user behind a session or access key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// User row id
    pub id: UserId,

    /// Administrators see every network
    pub admin: bool,
}

impl UserRef {
    /// A regular user, limited to the networks they belong to
    pub fn client(id: UserId) -> Self {
        Self { id, admin: false }
    }

    /// An administrator
    pub fn administrator(id: UserId) -> Self {
        Self { id, admin: true }
    }
}

/// One permission entry carried by an access key
///
/// `None` leaves a dimension unconstrained; `Some` is an allow-list, and an
/// explicitly empty allow-list permits nothing on that dimension.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Networks the grant is limited to
    pub networks: Option<Vec<NetworkId>>,

    /// Devices the grant is limited to, by guid
    pub devices: Option<Vec<DeviceGuid>>,
}

impl PermissionGrant {
    /// Grant with no narrowing on either dimension
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Limit the grant to the given networks
    pub fn with_networks(mut self, networks: Vec<NetworkId>) -> Self {
        self.networks = Some(networks);
        self
    }

    /// Limit the grant to the given devices
    pub fn with_devices(mut self, devices: Vec<DeviceGuid>) -> Self {
        self.devices = Some(devices);
        self
    }
}
