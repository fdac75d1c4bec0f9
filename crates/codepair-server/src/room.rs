//! Room store: the authoritative copy of each room's shared buffer state,
//! plus live membership for relay fan-out.
//!
//! One coarse lock over the room map; updates are last-write-wins and
//! contention stays at a handful of participants per room. Nothing awaits
//! while the lock is held.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};

use codepair_common::ConnectionId;

/// Role a participant declares when joining. Only editors may mutate
/// room state; the gateway enforces this on every edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Editor,
    Viewer,
}

impl Role {
    pub fn can_edit(&self) -> bool {
        matches!(self, Role::Editor)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Editor => write!(f, "editor"),
            Role::Viewer => write!(f, "viewer"),
        }
    }
}

/// Which shared buffer field an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Code,
    Language,
    Input,
}

/// Full copy of a room's state, sent to late joiners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub code: Option<String>,
    pub language: Option<String>,
    pub input: Option<String>,
}

struct Member {
    role: Role,
    tx: mpsc::Sender<String>,
}

#[derive(Default)]
struct Room {
    code: Option<String>,
    language: Option<String>,
    input: Option<String>,
    members: HashMap<ConnectionId, Member>,
}

impl Room {
    /// `None` until something has been written; a room that only has
    /// members holds no state to sync.
    fn snapshot(&self) -> Option<RoomSnapshot> {
        if self.code.is_none() && self.language.is_none() && self.input.is_none() {
            return None;
        }
        Some(RoomSnapshot {
            code: self.code.clone(),
            language: self.language.clone(),
            input: self.input.clone(),
        })
    }
}

/// Thread-safe room store. Rooms are created implicitly on first join or
/// edit and never removed; an empty room is inert, not an error.
#[derive(Clone, Default)]
pub struct RoomStore {
    rooms: Arc<RwLock<HashMap<String, Room>>>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a member, creating the room entry if needed. Returns the
    /// room's snapshot when it already holds state (late-join catch-up).
    pub async fn join(
        &self,
        room_id: &str,
        conn_id: ConnectionId,
        role: Role,
        tx: mpsc::Sender<String>,
    ) -> Option<RoomSnapshot> {
        let mut map = self.rooms.write().await;
        let room = map.entry(room_id.to_string()).or_default();
        let snapshot = room.snapshot();
        room.members.insert(conn_id, Member { role, tx });
        snapshot
    }

    /// Last-write-wins update of one field, creating the room if absent.
    /// Returns the outbound senders of every member except the editor,
    /// captured under the same lock as the write.
    pub async fn apply_edit(
        &self,
        room_id: &str,
        editor: &ConnectionId,
        field: EditField,
        value: String,
    ) -> Vec<mpsc::Sender<String>> {
        let mut map = self.rooms.write().await;
        let room = map.entry(room_id.to_string()).or_default();
        match field {
            EditField::Code => room.code = Some(value),
            EditField::Language => room.language = Some(value),
            EditField::Input => room.input = Some(value),
        }
        room.members
            .iter()
            .filter(|(id, _)| *id != editor)
            .map(|(_, member)| member.tx.clone())
            .collect()
    }

    /// Current state snapshot; `None` when the room is unknown or stateless.
    pub async fn get(&self, room_id: &str) -> Option<RoomSnapshot> {
        self.rooms.read().await.get(room_id)?.snapshot()
    }

    /// Drop a member. The room entry persists (rooms are not
    /// reference-counted).
    pub async fn leave(&self, room_id: &str, conn_id: &ConnectionId) {
        if let Some(room) = self.rooms.write().await.get_mut(room_id) {
            room.members.remove(conn_id);
        }
    }

    pub async fn member_count(&self, room_id: &str) -> usize {
        self.rooms
            .read()
            .await
            .get(room_id)
            .map(|room| room.members.len())
            .unwrap_or(0)
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
        mpsc::channel(16)
    }

    #[tokio::test]
    async fn join_unseen_room_yields_no_snapshot() {
        let store = RoomStore::new();
        let (tx, _rx) = channel();

        let snapshot = store.join("r1", ConnectionId::new(), Role::Editor, tx).await;

        assert!(snapshot.is_none());
        assert_eq!(store.room_count().await, 1);
        assert_eq!(store.member_count("r1").await, 1);
        // Membership alone is not state.
        assert!(store.get("r1").await.is_none());
    }

    #[tokio::test]
    async fn join_after_edits_yields_latest_state() {
        let store = RoomStore::new();
        let editor = ConnectionId::new();
        let (tx, _rx) = channel();
        store
            .join("r1", editor.clone(), Role::Editor, tx)
            .await;

        store
            .apply_edit("r1", &editor, EditField::Code, "x = 1".into())
            .await;
        store
            .apply_edit("r1", &editor, EditField::Code, "x = 2".into())
            .await;
        store
            .apply_edit("r1", &editor, EditField::Language, "python".into())
            .await;

        let (tx2, _rx2) = channel();
        let snapshot = store
            .join("r1", ConnectionId::new(), Role::Viewer, tx2)
            .await
            .expect("room has state");

        assert_eq!(snapshot.code.as_deref(), Some("x = 2"));
        assert_eq!(snapshot.language.as_deref(), Some("python"));
        assert_eq!(snapshot.input, None);
    }

    #[tokio::test]
    async fn edit_creates_room_implicitly() {
        let store = RoomStore::new();
        let editor = ConnectionId::new();

        store
            .apply_edit("fresh", &editor, EditField::Input, "42".into())
            .await;

        let snapshot = store.get("fresh").await.expect("room created by edit");
        assert_eq!(snapshot.input.as_deref(), Some("42"));
        assert_eq!(snapshot.code, None);
    }

    #[tokio::test]
    async fn edits_relay_to_peers_only() {
        let store = RoomStore::new();
        let editor = ConnectionId::new();
        let viewer = ConnectionId::new();
        let (editor_tx, mut editor_rx) = channel();
        let (viewer_tx, mut viewer_rx) = channel();

        store
            .join("r1", editor.clone(), Role::Editor, editor_tx)
            .await;
        store
            .join("r1", viewer.clone(), Role::Viewer, viewer_tx)
            .await;

        let peers = store
            .apply_edit("r1", &editor, EditField::Code, "x = 1".into())
            .await;
        assert_eq!(peers.len(), 1);
        for peer in &peers {
            peer.try_send("x = 1".to_string()).unwrap();
        }

        assert_eq!(viewer_rx.recv().await.unwrap(), "x = 1");
        assert!(editor_rx.try_recv().is_err());
        assert_eq!(
            store.get("r1").await.unwrap().code.as_deref(),
            Some("x = 1")
        );
    }

    #[tokio::test]
    async fn concurrent_edits_settle_on_one_writer() {
        let store = RoomStore::new();
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let editor = ConnectionId::new();
                store
                    .apply_edit("r1", &editor, EditField::Code, format!("v{i}"))
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let code = store.get("r1").await.unwrap().code.unwrap();
        assert!(code.starts_with('v'));
        let n: usize = code[1..].parse().unwrap();
        assert!(n < 32);
    }

    #[tokio::test]
    async fn leave_keeps_room_state() {
        let store = RoomStore::new();
        let editor = ConnectionId::new();
        let (tx, _rx) = channel();
        store.join("r1", editor.clone(), Role::Editor, tx).await;
        store
            .apply_edit("r1", &editor, EditField::Code, "x".into())
            .await;

        store.leave("r1", &editor).await;

        assert_eq!(store.member_count("r1").await, 0);
        assert_eq!(store.room_count().await, 1);
        assert!(store.get("r1").await.is_some());
    }

    #[test]
    fn role_permissions() {
        assert!(Role::Editor.can_edit());
        assert!(!Role::Viewer.can_edit());
        assert_eq!(Role::Editor.to_string(), "editor");
        assert_eq!(Role::Viewer.to_string(), "viewer");
    }
}
