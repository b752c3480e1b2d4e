use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::*;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{error::SendError, UnboundedSender};

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Outbound half of one client session.
///
/// Frames pushed here are written to the socket by a dedicated writer task, so
/// sending never waits on the network.
///
/// Membership ends for good: once a connection has left its room, every clone
/// of it is refused by [`ConnectionRegistry::join`].
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    sender: UnboundedSender<String>,
    departed: Arc<AtomicBool>,
}

impl Connection {
    pub fn new(sender: UnboundedSender<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            sender,
            departed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn has_departed(&self) -> bool {
        self.departed.load(Ordering::Acquire)
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn send(&self, frame: String) -> Result<(), SendError<String>> {
        self.sender.send(frame)
    }
}

/// Room membership for one hub, with dual indices.
///
/// Every operation takes a DashMap shard lock only for the map operation
/// itself. Guards on `rooms` and `memberships` are never held at the same time.
pub struct ConnectionRegistry<K> {
    /// Room key -> members of that room
    rooms: DashMap<K, HashMap<ConnectionId, Connection>>,

    /// Connection -> the single room it belongs to
    memberships: DashMap<ConnectionId, K>,
}

impl<K> ConnectionRegistry<K>
where
    K: Eq + Hash + Clone + std::fmt::Display,
{
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            memberships: DashMap::new(),
        }
    }

    /// Adds `connection` to `room`, creating the room on first use.
    ///
    /// Joining the room a connection is already in is a no-op. A connection
    /// that belongs to another room, or that has already left one, is refused
    /// and `false` is returned.
    pub fn join(&self, room: &K, connection: Connection) -> bool {
        let id = connection.id().clone();

        if connection.has_departed() {
            warn!(
                "Connection {} has already left its room, refusing join to {room}",
                id.as_str()
            );
            return false;
        }

        match self.memberships.entry(id.clone()) {
            Entry::Occupied(entry) => {
                if entry.get() != room {
                    warn!(
                        "Connection {} is already in room {}, refusing join to {}",
                        id.as_str(),
                        entry.get(),
                        room
                    );
                    return false;
                }
                return true;
            }
            Entry::Vacant(entry) => {
                entry.insert(room.clone());
            }
        }

        self.rooms
            .entry(room.clone())
            .or_default()
            .insert(id, connection);

        true
    }

    /// Removes the connection from `room`. Absent connections are ignored.
    ///
    /// The room itself is kept, even when it becomes empty.
    pub fn leave(&self, room: &K, connection_id: &ConnectionId) {
        let removed = self
            .memberships
            .remove_if(connection_id, |_, joined| joined == room)
            .is_some();

        if let Some(mut members) = self.rooms.get_mut(room) {
            if let Some(connection) = members.remove(connection_id) {
                connection.departed.store(true, Ordering::Release);
            }
        }

        if removed {
            trace!("Connection {} left room {room}", connection_id.as_str());
        }
    }

    /// Point-in-time copy of the members of `room`.
    ///
    /// The shard lock is released before this returns, so callers can deliver
    /// to the copy without blocking joins and leaves.
    pub fn snapshot(&self, room: &K) -> Vec<Connection> {
        self.rooms
            .get(room)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn member_count(&self, room: &K) -> usize {
        self.rooms.get(room).map(|members| members.len()).unwrap_or(0)
    }

    pub fn contains(&self, room: &K, connection_id: &ConnectionId) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|members| members.contains_key(connection_id))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of live connections across every room.
    pub fn connection_count(&self) -> usize {
        self.memberships.len()
    }
}

impl<K> Default for ConnectionRegistry<K>
where
    K: Eq + Hash + Clone + std::fmt::Display,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn connection() -> (Connection, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Connection::new(tx), rx)
    }

    #[test]
    fn join_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = connection();

        assert!(registry.join(&42, conn.clone()));
        assert!(registry.join(&42, conn.clone()));

        assert_eq!(registry.member_count(&42), 1);
        assert_eq!(registry.connection_count(), 1);
    }

    #[test]
    fn connection_cannot_be_in_two_rooms() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = connection();

        assert!(registry.join(&1, conn.clone()));
        assert!(!registry.join(&2, conn.clone()));

        assert!(registry.contains(&1, conn.id()));
        assert_eq!(registry.member_count(&2), 0);
    }

    #[test]
    fn leave_twice_matches_leave_once() {
        let registry = ConnectionRegistry::new();
        let (a, _rx_a) = connection();
        let (b, _rx_b) = connection();
        registry.join(&"6_7".to_string(), a.clone());
        registry.join(&"6_7".to_string(), b.clone());

        registry.leave(&"6_7".to_string(), a.id());
        let after_once: Vec<_> = registry
            .snapshot(&"6_7".to_string())
            .iter()
            .map(|c| c.id().clone())
            .collect();

        registry.leave(&"6_7".to_string(), a.id());
        let after_twice: Vec<_> = registry
            .snapshot(&"6_7".to_string())
            .iter()
            .map(|c| c.id().clone())
            .collect();

        assert_eq!(after_once, after_twice);
        assert_eq!(after_twice, vec![b.id().clone()]);
        assert_eq!(registry.connection_count(), 1);
    }

    #[test]
    fn connection_cannot_rejoin_after_leaving() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = connection();
        let stale_copy = conn.clone();
        registry.join(&42, conn.clone());
        registry.leave(&42, conn.id());

        assert!(stale_copy.has_departed());
        assert!(!registry.join(&42, stale_copy));
        assert!(!registry.join(&7, conn.clone()));
        assert_eq!(registry.member_count(&42), 0);
        assert_eq!(registry.connection_count(), 0);
    }

    #[test]
    fn leave_of_unknown_connection_is_a_no_op() {
        let registry: ConnectionRegistry<i32> = ConnectionRegistry::new();
        registry.leave(&9, &ConnectionId::new());
        assert_eq!(registry.room_count(), 0);
    }

    #[test]
    fn leave_for_another_room_does_not_remove_membership() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = connection();
        registry.join(&1, conn.clone());

        registry.leave(&2, conn.id());

        assert!(registry.contains(&1, conn.id()));
        assert_eq!(registry.connection_count(), 1);
    }

    #[test]
    fn empty_rooms_are_retained() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = connection();
        registry.join(&42, conn.clone());
        registry.leave(&42, conn.id());

        assert_eq!(registry.room_count(), 1);
        assert_eq!(registry.member_count(&42), 0);
        assert!(registry.snapshot(&42).is_empty());
    }

    #[test]
    fn snapshot_is_detached_from_later_changes() {
        let registry = ConnectionRegistry::new();
        let (a, _rx_a) = connection();
        let (b, _rx_b) = connection();
        registry.join(&42, a.clone());

        let snapshot = registry.snapshot(&42);
        registry.join(&42, b.clone());
        registry.leave(&42, a.id());

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id(), a.id());
        assert_eq!(registry.snapshot(&42)[0].id(), b.id());
    }

    #[test]
    fn snapshot_of_unknown_room_is_empty() {
        let registry: ConnectionRegistry<String> = ConnectionRegistry::new();
        assert!(registry.snapshot(&"nobody_here".to_string()).is_empty());
    }

    #[tokio::test]
    async fn concurrent_joins_and_leaves_are_consistent() {
        let registry = std::sync::Arc::new(ConnectionRegistry::new());
        let mut handles = Vec::new();

        for i in 0..64 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let (tx, _rx) = mpsc::unbounded_channel();
                let conn = Connection::new(tx);
                registry.join(&(i % 4), conn.clone());
                if i % 2 == 0 {
                    registry.leave(&(i % 4), conn.id());
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let total: usize = (0..4).map(|room| registry.member_count(&room)).sum();
        assert_eq!(total, 32);
        assert_eq!(registry.connection_count(), 32);
    }
}
