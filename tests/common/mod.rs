//! Shared fleet fixture for integration tests
//!
//! A small two-network fleet with a seeded notification corpus, plus a
//! reference evaluator that answers plans from the in-memory corpus the
//! same way the backend answers compiled statements.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;

use gridpulse::access::ScopeDirectory;
use gridpulse::model::{
    Device, DeviceGuid, DeviceId, NetworkId, Notification, NotificationId, UserId,
};
use gridpulse::planner::{QueryPlan, SortField, SortSpec};
use gridpulse::predicate::Predicate;

/// Administrator account
pub const ADMIN: UserId = UserId(1);
/// Member of network 1 only
pub const NETWORK_ONE_MEMBER: UserId = UserId(7);
/// Member of network 3 only
pub const NETWORK_THREE_MEMBER: UserId = UserId(8);
/// User with no network memberships
pub const OUTSIDER: UserId = UserId(9);

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Row ids of a result, in result order
pub fn ids(rows: &[Notification]) -> Vec<i64> {
    rows.iter().map(|n| n.id.0).collect()
}

/// Two networks, three devices, twelve notifications
///
/// Network 1 owns devices 10 and 11; network 3 owns device 20. Device 10
/// carries a run of "temperature" rows spaced for bucketing, an
/// "equipment" pair sharing one timestamp (ids 10 and 11), and a lone
/// "status" row landing in the same bucket as the first temperatures.
pub struct Fleet {
    devices: HashMap<DeviceId, Device>,
    notifications: Vec<Notification>,
    memberships: HashMap<UserId, Vec<NetworkId>>,
}

impl Fleet {
    pub fn seeded() -> Self {
        let devices = [
            Device::new(DeviceId(10), DeviceGuid(Uuid::from_u128(0xA0)), NetworkId(1)),
            Device::new(DeviceId(11), DeviceGuid(Uuid::from_u128(0xB0)), NetworkId(1)),
            Device::new(DeviceId(20), DeviceGuid(Uuid::from_u128(0xC0)), NetworkId(3)),
        ];

        let rows = [
            (1, 10, "temperature", 0),
            (2, 10, "temperature", 10),
            (3, 10, "temperature", 20),
            (4, 10, "temperature", 35),
            (5, 10, "temperature", 40),
            (6, 11, "equipment", 5),
            (7, 11, "equipment", 25),
            (8, 20, "temperature", 8),
            (9, 20, "status", 50),
            (10, 10, "equipment", 60),
            (11, 10, "equipment", 60),
            (12, 10, "status", 12),
        ];

        let notifications = rows
            .into_iter()
            .map(|(id, device, name, secs)| {
                Notification::new(
                    NotificationId(id),
                    DeviceId(device),
                    name,
                    at(secs),
                    json!({ "seq": id }),
                )
            })
            .collect();

        let memberships = HashMap::from([
            (NETWORK_ONE_MEMBER, vec![NetworkId(1)]),
            (NETWORK_THREE_MEMBER, vec![NetworkId(3)]),
        ]);

        Self {
            devices: devices.into_iter().map(|d| (d.id, d)).collect(),
            notifications,
            memberships,
        }
    }

    /// The full corpus, unscoped
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Network owning the given device
    pub fn network_of(&self, device: DeviceId) -> NetworkId {
        self.devices[&device].network_id
    }

    /// External guid of the given device
    pub fn guid_of(&self, device: DeviceId) -> DeviceGuid {
        self.devices[&device].guid
    }

    /// All corpus rows the predicate admits
    pub fn matching(&self, predicate: &Predicate) -> Vec<Notification> {
        self.notifications
            .iter()
            .filter(|n| predicate.matches(n, &self.devices[&n.device_id]))
            .cloned()
            .collect()
    }

    /// Answers a plan from the corpus
    pub fn evaluate(&self, plan: &QueryPlan) -> Vec<Notification> {
        match plan {
            QueryPlan::Empty => Vec::new(),

            QueryPlan::Direct(direct) => {
                let mut rows = self.matching(&direct.predicate);
                sort_rows(&mut rows, direct.sort);
                paginate(rows, direct.skip, direct.take)
            }

            QueryPlan::Bucketed(bucketed) => {
                // One representative per (name, bucket): earliest
                // timestamp, lowest id on ties.
                let mut representatives: HashMap<(String, i64), Notification> = HashMap::new();
                for candidate in self.matching(&bucketed.predicate) {
                    let key = (
                        candidate.name.clone(),
                        bucketed.bucket_index(candidate.timestamp),
                    );
                    match representatives.entry(key) {
                        Entry::Occupied(mut held) => {
                            let current = held.get();
                            if (candidate.timestamp, candidate.id)
                                < (current.timestamp, current.id)
                            {
                                held.insert(candidate);
                            }
                        }
                        Entry::Vacant(slot) => {
                            slot.insert(candidate);
                        }
                    }
                }

                let mut keyed: Vec<(i64, Notification)> = representatives
                    .into_iter()
                    .map(|((_, bucket), n)| (bucket, n))
                    .collect();

                let ordered = match bucketed.sort {
                    None => {
                        keyed.sort_by(|a, b| {
                            (a.0, a.1.name.as_str()).cmp(&(b.0, b.1.name.as_str()))
                        });
                        keyed.into_iter().map(|(_, n)| n).collect()
                    }
                    Some(spec) => {
                        let mut rows: Vec<Notification> =
                            keyed.into_iter().map(|(_, n)| n).collect();
                        sort_rows(&mut rows, Some(spec));
                        rows
                    }
                };

                paginate(ordered, bucketed.skip, bucketed.take)
            }
        }
    }
}

impl ScopeDirectory for Fleet {
    fn member_networks(&self, user: UserId) -> Vec<NetworkId> {
        self.memberships.get(&user).cloned().unwrap_or_default()
    }

    fn device_ids_by_guid(&self, guids: &[DeviceGuid]) -> Vec<DeviceId> {
        let mut found: Vec<DeviceId> = self
            .devices
            .values()
            .filter(|d| guids.contains(&d.guid))
            .map(|d| d.id)
            .collect();
        found.sort();
        found
    }
}

/// Explicit sort, or the deterministic (timestamp, id) default
fn sort_rows(rows: &mut [Notification], sort: Option<SortSpec>) {
    match sort {
        None => rows.sort_by(|a, b| (a.timestamp, a.id).cmp(&(b.timestamp, b.id))),
        Some(spec) => rows.sort_by(|a, b| {
            let primary = match spec.field {
                SortField::Timestamp => a.timestamp.cmp(&b.timestamp),
                SortField::Id => a.id.cmp(&b.id),
                SortField::Name => a.name.cmp(&b.name),
            };
            let primary = if spec.ascending {
                primary
            } else {
                primary.reverse()
            };
            // Ties always break by ascending id, whatever the direction
            primary.then_with(|| a.id.cmp(&b.id))
        }),
    }
}

fn paginate(rows: Vec<Notification>, skip: Option<i32>, take: Option<i32>) -> Vec<Notification> {
    let skip = skip.unwrap_or(0).max(0) as usize;
    let take = take.map(|t| t.max(0) as usize).unwrap_or(usize::MAX);
    rows.into_iter().skip(skip).take(take).collect()
}
