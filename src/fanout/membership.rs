use std::collections::{HashMap, HashSet};

use super::types::{ConnectionId, GroupId};

/// Two-way index of connection <-> group membership edges
///
/// The table does no locking of its own. It is owned by the
/// [`ConnectionRegistry`](super::ConnectionRegistry), which serializes every
/// mutation together with connection registration.
#[derive(Debug, Default)]
pub struct MembershipTable {
    by_group: HashMap<GroupId, HashSet<ConnectionId>>,
    by_connection: HashMap<ConnectionId, HashSet<GroupId>>,
}

impl MembershipTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the edge. Returns false if it already existed.
    pub fn join(&mut self, connection: ConnectionId, group: GroupId) -> bool {
        let added = self
            .by_connection
            .entry(connection)
            .or_default()
            .insert(group.clone());

        if added {
            self.by_group.entry(group).or_default().insert(connection);
        }
        added
    }

    /// Removes the edge. Returns false if there was nothing to remove.
    pub fn leave(&mut self, connection: ConnectionId, group: &GroupId) -> bool {
        let removed = match self.by_connection.get_mut(&connection) {
            Some(groups) => {
                let removed = groups.remove(group);
                if groups.is_empty() {
                    self.by_connection.remove(&connection);
                }
                removed
            }
            None => false,
        };

        if removed {
            self.detach_from_group(connection, group);
        }
        removed
    }

    /// Drops every edge of the connection and returns the groups it was in
    pub fn remove_connection(&mut self, connection: ConnectionId) -> Vec<GroupId> {
        let groups: Vec<GroupId> = self
            .by_connection
            .remove(&connection)
            .map(|groups| groups.into_iter().collect())
            .unwrap_or_default();

        for group in &groups {
            self.detach_from_group(connection, group);
        }
        groups
    }

    fn detach_from_group(&mut self, connection: ConnectionId, group: &GroupId) {
        if let Some(members) = self.by_group.get_mut(group) {
            members.remove(&connection);
            if members.is_empty() {
                self.by_group.remove(group);
            }
        }
    }

    pub fn members_of(&self, group: &GroupId) -> HashSet<ConnectionId> {
        self.by_group.get(group).cloned().unwrap_or_default()
    }

    pub fn groups_of(&self, connection: ConnectionId) -> HashSet<GroupId> {
        self.by_connection
            .get(&connection)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of groups with at least one member
    pub fn group_count(&self) -> usize {
        self.by_group.len()
    }
}
