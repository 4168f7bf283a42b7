//! Session registry
//!
//! Maps turtle labels to their live connection handles and tracks the single
//! currently selected turtle. Connection handles are ephemeral; the registry
//! is rebuilt from scratch each process run as turtles reconnect.

use crate::error::AppError;
use crate::protocol::{Label, Outbound};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Process-unique identity of one connection
///
/// Used for identity-checked removal: a reconnect replaces the handle stored
/// under a label, and the superseded session's later unregister must not evict
/// the newer one.
pub type ConnId = Uuid;

/// Handle to one live turtle connection
///
/// Frames queued here are drained by the connection's writer task, so sending
/// never blocks on a stalled peer.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    /// Identity of the underlying connection
    pub conn_id: ConnId,
    sender: mpsc::UnboundedSender<Outbound>,
}

impl SessionHandle {
    /// Wrap the write side of a connection's outbound queue
    pub fn new(sender: mpsc::UnboundedSender<Outbound>) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            sender,
        }
    }

    /// Queue one outbound frame; fails if the connection is closed
    pub fn send(&self, frame: Outbound) -> Result<(), AppError> {
        self.sender
            .send(frame)
            .map_err(|_| AppError::NoTurtleConnected)
    }

    /// Whether the connection's outbound queue is still open
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    sessions: HashMap<Label, SessionHandle>,
    selected: Option<Label>,
}

/// Concurrency-safe label -> live session mapping plus the selection pointer
///
/// Cloning is cheap; all clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a label to a live connection
    ///
    /// Replaces any prior handle for the label (a reconnect supersedes the old
    /// session) and returns the superseded handle, if any.
    pub async fn register(&self, label: Label, handle: SessionHandle) -> Option<SessionHandle> {
        let mut inner = self.inner.write().await;
        inner.sessions.insert(label, handle)
    }

    /// Remove the entry for `label`, but only if it still holds `conn_id`
    ///
    /// Idempotent; a superseded session's unregister is a no-op because the
    /// identity check fails against the newer handle.
    pub async fn unregister(&self, label: Label, conn_id: ConnId) {
        let mut inner = self.inner.write().await;
        if inner
            .sessions
            .get(&label)
            .is_some_and(|handle| handle.conn_id == conn_id)
        {
            inner.sessions.remove(&label);
        }
    }

    /// Get the live handle for a label, if one is registered
    pub async fn lookup(&self, label: Label) -> Option<SessionHandle> {
        self.inner.read().await.sessions.get(&label).cloned()
    }

    /// Point the selection at `label`
    ///
    /// Returns false (and leaves the selection unchanged) if no live session
    /// is registered under that label.
    pub async fn set_selected(&self, label: Label) -> bool {
        let mut inner = self.inner.write().await;
        if inner.sessions.contains_key(&label) {
            inner.selected = Some(label);
            true
        } else {
            false
        }
    }

    /// The currently selected label, if any
    pub async fn get_selected(&self) -> Option<Label> {
        self.inner.read().await.selected
    }

    /// The selected turtle's live handle, if one is selected and registered
    pub async fn selected_session(&self) -> Option<SessionHandle> {
        let inner = self.inner.read().await;
        inner
            .selected
            .and_then(|label| inner.sessions.get(&label).cloned())
    }

    /// Number of live sessions
    pub async fn session_count(&self) -> usize {
        self.inner.read().await.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_handle() -> (SessionHandle, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (SessionHandle::new(tx), rx)
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let registry = SessionRegistry::new();
        let (handle, _rx) = test_handle();

        assert!(registry.register(4821, handle.clone()).await.is_none());
        let found = registry.lookup(4821).await.unwrap();
        assert_eq!(found.conn_id, handle.conn_id);
        assert!(registry.lookup(9999).await.is_none());
    }

    #[tokio::test]
    async fn test_reconnect_supersedes_old_session() {
        let registry = SessionRegistry::new();
        let (old, _old_rx) = test_handle();
        let (new, _new_rx) = test_handle();

        registry.register(4821, old.clone()).await;
        let superseded = registry.register(4821, new.clone()).await.unwrap();
        assert_eq!(superseded.conn_id, old.conn_id);

        // Lookup now resolves to the new connection
        assert_eq!(registry.lookup(4821).await.unwrap().conn_id, new.conn_id);

        // The old session's unregister must not evict the newer one
        registry.unregister(4821, old.conn_id).await;
        assert_eq!(registry.lookup(4821).await.unwrap().conn_id, new.conn_id);

        // The new session's own unregister removes it
        registry.unregister(4821, new.conn_id).await;
        assert!(registry.lookup(4821).await.is_none());
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let registry = SessionRegistry::new();
        let (handle, _rx) = test_handle();

        registry.register(4821, handle.clone()).await;
        registry.unregister(4821, handle.conn_id).await;
        registry.unregister(4821, handle.conn_id).await;
        assert_eq!(registry.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_selection() {
        let registry = SessionRegistry::new();
        let (handle, _rx) = test_handle();

        // Cannot select a label with no live session
        assert!(!registry.set_selected(4821).await);
        assert_eq!(registry.get_selected().await, None);

        registry.register(4821, handle.clone()).await;
        assert!(registry.set_selected(4821).await);
        assert_eq!(registry.get_selected().await, Some(4821));
        assert_eq!(
            registry.selected_session().await.unwrap().conn_id,
            handle.conn_id
        );

        // Selection may dangle after unregister; dispatch handles absence
        registry.unregister(4821, handle.conn_id).await;
        assert_eq!(registry.get_selected().await, Some(4821));
        assert!(registry.selected_session().await.is_none());
    }

    #[tokio::test]
    async fn test_handle_send_after_receiver_dropped() {
        let (handle, rx) = test_handle();
        assert!(handle.is_open());

        drop(rx);
        assert!(!handle.is_open());
        assert!(matches!(
            handle.send(Outbound::Stop),
            Err(AppError::NoTurtleConnected)
        ));
    }
}
