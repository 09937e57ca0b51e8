//! External change-notification subscription

use tokio::sync::mpsc;

use crate::types::TableScope;

/// Cloneable handle callers use to tell the engine that the grants behind
/// a scope changed.
///
/// Notifications are queued and drained by the engine's listener task;
/// bursts against a scope whose build is already in flight coalesce into a
/// single follow-up rebuild.
#[derive(Clone)]
pub struct UpdateTrigger {
    tx: mpsc::UnboundedSender<TableScope>,
}

impl UpdateTrigger {
    pub(super) fn channel() -> (Self, mpsc::UnboundedReceiver<TableScope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue a rebuild of the scope's table.
    ///
    /// Returns `false` if the engine's listener has shut down.
    pub fn notify(&self, scope: TableScope) -> bool {
        self.tx.send(scope).is_ok()
    }
}
