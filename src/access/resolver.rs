//! # Access Scope Resolution
//!
//! Turns a [`Principal`] into the predicate bounding what the caller may
//! see. The planner conjoins this predicate with caller filters, so scope
//! rides inside the compiled statement instead of being checked per row
//! after the fact.
//!
//! ## Invariants
//! - Deny by default: an access key with zero grants, a user with no
//!   network memberships, and a grant whose devices all fail to resolve
//!   each yield the match-nothing predicate
//! - Resolution only narrows; it never adds rows a caller filter excluded
//! - Resolution is deterministic given the directory view and performs no
//!   I/O of its own

use std::sync::Arc;

use crate::model::{DeviceGuid, DeviceId, NetworkId, UserId};
use crate::predicate::Predicate;

use super::principal::{PermissionGrant, Principal, UserRef};

/// Read view over network membership and device identity
///
/// The resolver does not own this data; callers inject whatever backs it
/// (an in-memory cache, a replica snapshot, a test fixture). Lookups are
/// infallible: an unknown user simply has no memberships and an unknown
/// guid resolves to nothing.
pub trait ScopeDirectory: Send + Sync {
    /// Networks the user belongs to
    fn member_networks(&self, user: UserId) -> Vec<NetworkId>;

    /// Device row ids for the given guids; unknown guids are omitted
    fn device_ids_by_guid(&self, guids: &[DeviceGuid]) -> Vec<DeviceId>;
}

impl<D: ScopeDirectory + ?Sized> ScopeDirectory for Arc<D> {
    fn member_networks(&self, user: UserId) -> Vec<NetworkId> {
        (**self).member_networks(user)
    }

    fn device_ids_by_guid(&self, guids: &[DeviceGuid]) -> Vec<DeviceId> {
        (**self).device_ids_by_guid(guids)
    }
}

/// Resolves principals to visibility predicates
pub struct AccessScopeResolver<D: ScopeDirectory> {
    directory: D,
}

impl<D: ScopeDirectory> AccessScopeResolver<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// The visibility predicate for a principal
    pub fn resolve(&self, principal: &Principal) -> Predicate {
        match principal {
            Principal::Unrestricted => Predicate::True,

            Principal::User(user) => self.user_clause(user),

            // A device sees only its own rows.
            Principal::Device { id } => Predicate::device_eq(*id),

            Principal::AccessKey { owner, grants } => {
                let granted =
                    Predicate::any(grants.iter().map(|g| self.grant_clause(g)).collect());
                self.user_clause(owner).and(granted)
            }
        }
    }

    /// Scope contributed by the user identity itself
    fn user_clause(&self, user: &UserRef) -> Predicate {
        if user.admin {
            Predicate::True
        } else {
            Predicate::network_in(&self.directory.member_networks(user.id))
        }
    }

    /// Scope contributed by one grant; unconstrained dimensions drop out
    fn grant_clause(&self, grant: &PermissionGrant) -> Predicate {
        let mut clauses = Vec::new();
        if let Some(networks) = &grant.networks {
            clauses.push(Predicate::network_in(networks));
        }
        if let Some(guids) = &grant.devices {
            let ids = self.directory.device_ids_by_guid(guids);
            clauses.push(Predicate::device_in(&ids));
        }
        Predicate::all(clauses)
    }
}
