// object_index.rs: maps save-file object indices to loaded object handles
//
// Sprites refer to rides and ride entries by their one-byte index in the
// save file. The loaded game may have assigned different handles, so every
// such reference passes through an ObjectIndexTable on load and save.

use std::collections::HashMap;
use std::fmt;

use crate::error::{S6Error, S6Result};

/// Stored ride index meaning "no ride". Never looked up.
pub const RIDE_INDEX_NULL: u8 = 255;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Ride,
    RideEntry,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Ride => f.write_str("ride"),
            ObjectKind::RideEntry => f.write_str("ride entry"),
        }
    }
}

/// Handle of a ride in the running game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RideId(pub u16);

/// Handle of a loaded ride/vehicle object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RideEntryId(pub u16);

#[derive(Debug, Clone)]
struct IndexMap<H> {
    to_handle: HashMap<u8, H>,
    to_index: HashMap<H, u8>,
}

impl<H> Default for IndexMap<H> {
    fn default() -> Self {
        Self {
            to_handle: HashMap::new(),
            to_index: HashMap::new(),
        }
    }
}

impl<H: Copy + Eq + std::hash::Hash + fmt::Debug> IndexMap<H> {
    /// Ignores [`RIDE_INDEX_NULL`], which always means "none".
    fn insert(&mut self, kind: ObjectKind, index: u8, handle: H) -> bool {
        if index == RIDE_INDEX_NULL {
            log::warn!("ignoring {} mapping for reserved index {}: {:?}", kind, index, handle);
            return false;
        }
        if let Some(old) = self.to_handle.insert(index, handle) {
            self.to_index.remove(&old);
        }
        if let Some(old) = self.to_index.insert(handle, index) {
            if old != index {
                self.to_handle.remove(&old);
            }
        }
        true
    }
}

/// Bidirectional index/handle mapping for rides and ride entries.
///
/// Read-only for the duration of an import or export pass.
#[derive(Debug, Clone, Default)]
pub struct ObjectIndexTable {
    rides: IndexMap<RideId>,
    ride_entries: IndexMap<RideEntryId>,
}

impl ObjectIndexTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table where index `n` maps to handle `n` for every index below the
    /// given counts.
    pub fn identity(ride_count: u8, ride_entry_count: u8) -> Self {
        let mut table = Self::new();
        for i in 0..ride_count.min(RIDE_INDEX_NULL) {
            table.insert_ride(i, RideId(i as u16));
        }
        for i in 0..ride_entry_count.min(RIDE_INDEX_NULL) {
            table.insert_ride_entry(i, RideEntryId(i as u16));
        }
        table
    }

    /// Map `index` to `ride`, replacing any previous mapping of either.
    /// Returns false, leaving the table unchanged, for [`RIDE_INDEX_NULL`].
    pub fn insert_ride(&mut self, index: u8, ride: RideId) -> bool {
        self.rides.insert(ObjectKind::Ride, index, ride)
    }

    pub fn insert_ride_entry(&mut self, index: u8, entry: RideEntryId) -> bool {
        self.ride_entries.insert(ObjectKind::RideEntry, index, entry)
    }

    /// Resolve a stored ride index. [`RIDE_INDEX_NULL`] resolves to `None`.
    pub fn ride(&self, index: u8) -> S6Result<Option<RideId>> {
        if index == RIDE_INDEX_NULL {
            return Ok(None);
        }
        self.rides
            .to_handle
            .get(&index)
            .copied()
            .map(Some)
            .ok_or(S6Error::UnresolvedObjectReference {
                kind: ObjectKind::Ride,
                value: index as u32,
            })
    }

    /// Stored index for `ride`. `None` is written as [`RIDE_INDEX_NULL`].
    pub fn ride_index(&self, ride: Option<RideId>) -> S6Result<u8> {
        let Some(ride) = ride else {
            return Ok(RIDE_INDEX_NULL);
        };
        self.rides
            .to_index
            .get(&ride)
            .copied()
            .ok_or(S6Error::UnresolvedObjectReference {
                kind: ObjectKind::Ride,
                value: ride.0 as u32,
            })
    }

    pub fn ride_entry(&self, index: u8) -> S6Result<Option<RideEntryId>> {
        if index == RIDE_INDEX_NULL {
            return Ok(None);
        }
        self.ride_entries
            .to_handle
            .get(&index)
            .copied()
            .map(Some)
            .ok_or(S6Error::UnresolvedObjectReference {
                kind: ObjectKind::RideEntry,
                value: index as u32,
            })
    }

    pub fn ride_entry_index(&self, entry: Option<RideEntryId>) -> S6Result<u8> {
        let Some(entry) = entry else {
            return Ok(RIDE_INDEX_NULL);
        };
        self.ride_entries
            .to_index
            .get(&entry)
            .copied()
            .ok_or(S6Error::UnresolvedObjectReference {
                kind: ObjectKind::RideEntry,
                value: entry.0 as u32,
            })
    }
}
