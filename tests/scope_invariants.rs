//! Access scope invariant tests
//!
//! - Soundness: no request returns a row outside the caller's scope
//! - Narrowing: an access key sees at most what its owner sees
//! - Deny by default: no grants, no memberships or unknown guids all
//!   resolve to the match-nothing scope
//! - Denial is structural: out-of-scope requests produce empty results,
//!   not errors

mod common;

use std::sync::Arc;

use common::{at, ids, Fleet, ADMIN, NETWORK_ONE_MEMBER, NETWORK_THREE_MEMBER, OUTSIDER};
use gridpulse::access::{AccessScopeResolver, PermissionGrant, Principal, UserRef};
use gridpulse::model::{DeviceGuid, DeviceId, NetworkId};
use gridpulse::planner::{NotificationPoll, NotificationQuery, QueryPlanner};
use uuid::Uuid;

fn fixture() -> (Arc<Fleet>, AccessScopeResolver<Arc<Fleet>>, QueryPlanner) {
    let fleet = Arc::new(Fleet::seeded());
    let resolver = AccessScopeResolver::new(Arc::clone(&fleet));
    (fleet, resolver, QueryPlanner::new())
}

/// A poll whose watermark predates the whole corpus
fn poll_everything() -> NotificationPoll {
    NotificationPoll::newer_than(at(-1))
}

// =============================================================================
// Soundness
// =============================================================================

/// Every row a principal gets back lies inside that principal's scope.
#[test]
fn test_returned_rows_always_lie_inside_scope() {
    let (fleet, resolver, planner) = fixture();

    let principals = [
        Principal::unrestricted(),
        Principal::user(UserRef::administrator(ADMIN)),
        Principal::user(UserRef::client(NETWORK_ONE_MEMBER)),
        Principal::user(UserRef::client(NETWORK_THREE_MEMBER)),
        Principal::user(UserRef::client(OUTSIDER)),
        Principal::device(DeviceId(10)),
        Principal::access_key(
            UserRef::client(NETWORK_ONE_MEMBER),
            vec![PermissionGrant::unrestricted()
                .with_devices(vec![fleet.guid_of(DeviceId(11))])],
        ),
    ];

    for principal in &principals {
        let scope = resolver.resolve(principal);
        let plan = planner.plan_poll(&poll_everything(), scope.clone());

        let returned = ids(&fleet.evaluate(&plan));
        let mut visible = ids(&fleet.matching(&scope));
        visible.sort_unstable();

        let mut sorted_returned = returned.clone();
        sorted_returned.sort_unstable();
        assert_eq!(
            sorted_returned, visible,
            "principal {:?} must see exactly its scoped rows",
            principal
        );
    }
}

/// A network member polls exactly the rows of devices in its networks.
#[test]
fn test_member_poll_covers_exactly_its_networks() {
    let (fleet, resolver, planner) = fixture();

    let scope = resolver.resolve(&Principal::user(UserRef::client(NETWORK_ONE_MEMBER)));
    let plan = planner.plan_poll(&poll_everything(), scope);
    let rows = fleet.evaluate(&plan);

    for row in &rows {
        assert_eq!(fleet.network_of(row.device_id), NetworkId(1));
    }
    // (timestamp, id) order over devices 10 and 11
    assert_eq!(ids(&rows), vec![1, 6, 2, 12, 3, 7, 4, 5, 10, 11]);
}

/// An administrator sees the whole corpus.
#[test]
fn test_administrator_sees_everything() {
    let (fleet, resolver, planner) = fixture();

    let scope = resolver.resolve(&Principal::user(UserRef::administrator(ADMIN)));
    let plan = planner.plan_poll(&poll_everything(), scope);

    assert_eq!(fleet.evaluate(&plan).len(), fleet.notifications().len());
}

/// A device principal is confined to its own rows.
#[test]
fn test_device_principal_sees_only_itself() {
    let (fleet, resolver, planner) = fixture();

    let scope = resolver.resolve(&Principal::device(DeviceId(10)));
    let plan = planner.plan_poll(&poll_everything(), scope);
    let rows = fleet.evaluate(&plan);

    assert!(rows.iter().all(|n| n.device_id == DeviceId(10)));
    assert_eq!(ids(&rows), vec![1, 2, 12, 3, 4, 5, 10, 11]);
}

/// Querying a device from a foreign network yields nothing.
#[test]
fn test_query_for_foreign_device_returns_nothing() {
    let (fleet, resolver, planner) = fixture();

    // Device 10 belongs to network 1; the caller only sees network 3.
    let scope = resolver.resolve(&Principal::user(UserRef::client(NETWORK_THREE_MEMBER)));
    let request = NotificationQuery::for_device(DeviceId(10));
    let plan = planner.plan_query(&request, scope).unwrap();

    assert!(fleet.evaluate(&plan).is_empty());
}

// =============================================================================
// Access key narrowing
// =============================================================================

/// A device grant narrows the owner's view down to the granted devices.
#[test]
fn test_device_grant_narrows_owner_view() {
    let (fleet, resolver, planner) = fixture();

    let key = Principal::access_key(
        UserRef::client(NETWORK_ONE_MEMBER),
        vec![PermissionGrant::unrestricted()
            .with_devices(vec![fleet.guid_of(DeviceId(11))])],
    );
    let scope = resolver.resolve(&key);
    let plan = planner.plan_poll(&poll_everything(), scope);
    let rows = fleet.evaluate(&plan);

    assert_eq!(ids(&rows), vec![6, 7]);
}

/// A key never exceeds its owner: granting a foreign network adds nothing.
#[test]
fn test_key_cannot_exceed_owner() {
    let (fleet, resolver, planner) = fixture();

    let owner = Principal::user(UserRef::client(NETWORK_ONE_MEMBER));
    let key = Principal::access_key(
        UserRef::client(NETWORK_ONE_MEMBER),
        vec![PermissionGrant::unrestricted().with_networks(vec![NetworkId(3)])],
    );

    let owner_rows = ids(&fleet.evaluate(
        &planner.plan_poll(&poll_everything(), resolver.resolve(&owner)),
    ));
    let key_rows = ids(&fleet.evaluate(
        &planner.plan_poll(&poll_everything(), resolver.resolve(&key)),
    ));

    assert!(key_rows.iter().all(|id| owner_rows.contains(id)));
    // Network 3 is outside the owner's membership, so the key sees nothing.
    assert!(key_rows.is_empty());
}

/// A key with no grants resolves to the match-nothing scope.
#[test]
fn test_key_without_grants_sees_nothing() {
    let (fleet, resolver, planner) = fixture();

    let key = Principal::access_key(UserRef::client(NETWORK_ONE_MEMBER), vec![]);
    let plan = planner.plan_poll(&poll_everything(), resolver.resolve(&key));

    assert!(plan.is_empty());
    assert!(fleet.evaluate(&plan).is_empty());
}

/// A grant naming only unknown guids resolves to the match-nothing scope.
#[test]
fn test_grant_with_unknown_guids_sees_nothing() {
    let (fleet, resolver, planner) = fixture();

    let key = Principal::access_key(
        UserRef::client(NETWORK_ONE_MEMBER),
        vec![PermissionGrant::unrestricted()
            .with_devices(vec![DeviceGuid(Uuid::from_u128(0xDEAD))])],
    );
    let plan = planner.plan_poll(&poll_everything(), resolver.resolve(&key));

    assert!(plan.is_empty());
}

// =============================================================================
// Structural denial
// =============================================================================

/// A denied caller and a caller with no data get the same empty answer.
#[test]
fn test_denied_caller_and_empty_data_look_identical() {
    let (fleet, resolver, planner) = fixture();
    let request = NotificationQuery::for_device(DeviceId(10));

    // Outsider: scope collapses, plan is provably empty.
    let outsider_scope = resolver.resolve(&Principal::user(UserRef::client(OUTSIDER)));
    let outsider_plan = planner.plan_query(&request, outsider_scope).unwrap();
    assert!(outsider_plan.is_empty());

    // Foreign member: plan executes and simply matches nothing.
    let foreign_scope =
        resolver.resolve(&Principal::user(UserRef::client(NETWORK_THREE_MEMBER)));
    let foreign_plan = planner.plan_query(&request, foreign_scope).unwrap();
    assert!(!foreign_plan.is_empty());

    assert_eq!(
        fleet.evaluate(&outsider_plan),
        fleet.evaluate(&foreign_plan)
    );
}

/// Scope rides inside the query; caller filters still apply on top of it.
#[test]
fn test_scope_conjoins_with_caller_filters() {
    let (fleet, resolver, planner) = fixture();

    let scope = resolver.resolve(&Principal::user(UserRef::client(NETWORK_ONE_MEMBER)));
    let request = NotificationQuery::for_device(DeviceId(10))
        .with_name("equipment")
        .with_range(at(0), at(70));
    let plan = planner.plan_query(&request, scope).unwrap();
    let rows = fleet.evaluate(&plan);

    // Device 10 "equipment" rows inside the range, in (timestamp, id) order
    assert_eq!(ids(&rows), vec![10, 11]);
}

/// A closed time range keeps the rows sitting exactly on both bounds.
#[test]
fn test_closed_range_includes_both_bounds() {
    let (fleet, resolver, planner) = fixture();

    let scope = resolver.resolve(&Principal::user(UserRef::client(NETWORK_ONE_MEMBER)));
    let request = NotificationQuery::for_device(DeviceId(10))
        .with_name("temperature")
        .with_range(at(10), at(35));
    let plan = planner.plan_query(&request, scope).unwrap();
    let rows = fleet.evaluate(&plan);

    // Rows at t10 and t35 are the bounds themselves
    assert_eq!(ids(&rows), vec![2, 3, 4]);
}
