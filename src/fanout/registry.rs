use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use super::membership::MembershipTable;
use super::types::{ConnectionHandle, ConnectionId, GroupId, OutboundSender};

/// A connection picked for delivery, captured at snapshot time
#[derive(Debug, Clone)]
pub struct DeliveryTarget {
    pub connection_id: ConnectionId,
    pub sender: OutboundSender,
}

/// Point-in-time view of the targets for one dispatch
#[derive(Debug, Default)]
pub struct TargetSnapshot {
    /// Every registered connection
    pub everyone: Vec<DeliveryTarget>,
    /// Members of the requested room, empty when no room was requested
    pub room: Vec<DeliveryTarget>,
}

#[derive(Default)]
struct RegistryState {
    connections: HashMap<ConnectionId, OutboundSender>,
    membership: MembershipTable,
}

impl RegistryState {
    fn target(&self, id: ConnectionId) -> Option<DeliveryTarget> {
        self.connections.get(&id).map(|sender| DeliveryTarget {
            connection_id: id,
            sender: sender.clone(),
        })
    }
}

/// Process-wide owner of live connections and their room memberships
///
/// Both maps sit behind one lock so that `unregister` removes a connection
/// and all of its membership edges in a single step. None of the methods
/// await, so a critical section can never be suspended half-way.
#[derive(Default)]
pub struct ConnectionRegistry {
    state: RwLock<RegistryState>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation completes inside one critical section, so a poisoned
    // lock still guards consistent maps.
    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a connection with no memberships
    pub fn register(&self, sender: OutboundSender) -> ConnectionHandle {
        let id = ConnectionId::new();
        let total = {
            let mut state = self.write();
            state.connections.insert(id, sender);
            state.connections.len()
        };

        info!(connection_id = %id, connections = total, "Connection registered");
        ConnectionHandle::new(id)
    }

    /// Removes the connection and every membership edge it holds
    ///
    /// Returns false when the connection was already gone.
    pub fn unregister(&self, handle: &ConnectionHandle) -> bool {
        let id = handle.id();
        let (removed, groups) = {
            let mut state = self.write();
            let removed = state.connections.remove(&id).is_some();
            let groups = state.membership.remove_connection(id);
            (removed, groups)
        };

        if removed {
            info!(
                connection_id = %id,
                rooms_left = groups.len(),
                "Connection unregistered"
            );
        } else {
            debug!(connection_id = %id, "Unregister of unknown connection ignored");
        }
        removed
    }

    pub fn is_registered(&self, handle: &ConnectionHandle) -> bool {
        self.read().connections.contains_key(&handle.id())
    }

    /// Joins the connection to a room; no-op for unregistered handles
    pub fn join(&self, handle: &ConnectionHandle, group: GroupId) -> bool {
        let id = handle.id();
        let mut state = self.write();

        if !state.connections.contains_key(&id) {
            debug!(connection_id = %id, room = %group, "Join from unregistered connection ignored");
            return false;
        }

        let added = state.membership.join(id, group.clone());
        drop(state);

        if added {
            info!(connection_id = %id, room = %group, "Connection joined room");
        } else {
            debug!(connection_id = %id, room = %group, "Connection already in room");
        }
        added
    }

    /// Removes the connection from a room; no-op when absent
    pub fn leave(&self, handle: &ConnectionHandle, group: &GroupId) -> bool {
        let id = handle.id();
        let removed = self.write().membership.leave(id, group);

        if removed {
            info!(connection_id = %id, room = %group, "Connection left room");
        } else {
            debug!(connection_id = %id, room = %group, "Leave for absent membership ignored");
        }
        removed
    }

    pub fn members_of(&self, group: &GroupId) -> HashSet<ConnectionId> {
        self.read().membership.members_of(group)
    }

    pub fn groups_of(&self, handle: &ConnectionHandle) -> HashSet<GroupId> {
        self.read().membership.groups_of(handle.id())
    }

    pub fn connection_count(&self) -> usize {
        self.read().connections.len()
    }

    pub fn group_count(&self) -> usize {
        self.read().membership.group_count()
    }

    /// Captures delivery targets under a single read lock
    ///
    /// When `room` is given, its members are resolved from the same view as
    /// the global target list.
    pub fn snapshot(&self, room: Option<&GroupId>) -> TargetSnapshot {
        let state = self.read();

        let everyone = state
            .connections
            .iter()
            .map(|(id, sender)| DeliveryTarget {
                connection_id: *id,
                sender: sender.clone(),
            })
            .collect();

        let room = room
            .map(|group| {
                state
                    .membership
                    .members_of(group)
                    .into_iter()
                    .filter_map(|id| state.target(id))
                    .collect()
            })
            .unwrap_or_default();

        TargetSnapshot { everyone, room }
    }
}
