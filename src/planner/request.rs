//! # Query Requests
//!
//! Caller-facing request shapes, built up field by field the way transport
//! layers hand them over. Fields are carried as received; validation
//! happens when the planner turns a request into a plan.

use chrono::{DateTime, Utc};

use crate::model::DeviceId;

/// A historical query against one device's notifications
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationQuery {
    /// Device whose notifications are queried
    pub device: DeviceId,
    /// Inclusive start of the time range
    pub start: Option<DateTime<Utc>>,
    /// Inclusive end of the time range
    pub end: Option<DateTime<Utc>>,
    /// Exact-match name filter
    pub name: Option<String>,
    /// Sort column name, checked against the allow-list at plan time
    pub sort_field: Option<String>,
    /// Sort direction, ascending unless overridden
    pub sort_ascending: bool,
    /// Row limit
    pub take: Option<i32>,
    /// Row offset
    pub skip: Option<i32>,
    /// Bucket width in seconds; presence selects the down-sampling shape
    pub grid_interval: Option<i32>,
}

impl NotificationQuery {
    /// Query for one device with no filters
    pub fn for_device(device: DeviceId) -> Self {
        Self {
            device,
            start: None,
            end: None,
            name: None,
            sort_field: None,
            sort_ascending: true,
            take: None,
            skip: None,
            grid_interval: None,
        }
    }

    /// Sets the inclusive start of the time range
    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the inclusive end of the time range
    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Sets both ends of the time range
    pub fn with_range(self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.with_start(start).with_end(end)
    }

    /// Filters to one notification name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sorts by the named column, ascending
    pub fn with_sort(mut self, field: impl Into<String>) -> Self {
        self.sort_field = Some(field.into());
        self
    }

    /// Flips the sort direction to descending
    pub fn descending(mut self) -> Self {
        self.sort_ascending = false;
        self
    }

    /// Limits the number of returned rows
    pub fn with_take(mut self, take: i32) -> Self {
        self.take = Some(take);
        self
    }

    /// Skips leading rows of the sorted result
    pub fn with_skip(mut self, skip: i32) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Requests one representative row per name per bucket of the given
    /// width
    pub fn with_grid_interval(mut self, seconds: i32) -> Self {
        self.grid_interval = Some(seconds);
        self
    }
}

/// A poll for notifications newer than a watermark
///
/// Used by waiting clients that repeatedly ask "anything since X?" across
/// a set of devices. `devices: Some(vec![])` is an explicit empty
/// candidate set and yields an empty result without touching storage;
/// `devices: None` means no device filter at all.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPoll {
    /// Candidate devices; None applies no device filter
    pub devices: Option<Vec<DeviceId>>,
    /// Candidate names; None applies no name filter
    pub names: Option<Vec<String>>,
    /// Exclusive watermark: only rows strictly newer match
    pub since: DateTime<Utc>,
}

impl NotificationPoll {
    /// Poll for anything strictly newer than the watermark
    pub fn newer_than(since: DateTime<Utc>) -> Self {
        Self {
            devices: None,
            names: None,
            since,
        }
    }

    /// Restricts the poll to the given devices
    pub fn with_devices(mut self, devices: Vec<DeviceId>) -> Self {
        self.devices = Some(devices);
        self
    }

    /// Restricts the poll to the given names
    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = Some(names);
        self
    }
}
