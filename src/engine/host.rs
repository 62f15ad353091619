//! The transport boundary: where snapshots come from and orders go to.
//!
//! Acceptance and rejection notices arrive asynchronously on the host's own
//! threads as `HostEvent`s. Handlers only push into a channel
//! (`HostEventSender`); the decision loop, the single writer of shadow
//! state, applies the corrections at the start of its next cycle.

use std::sync::mpsc;
use std::time::{SystemTime, UNIX_EPOCH};

use super::snapshot::Snapshot;
use crate::core::{HostError, PrimitiveAction, UnitId};

/// The host process the agent plays through.
pub trait Host {
    /// Snapshot type produced by this host.
    type Game: Snapshot;

    /// Copy of the authoritative game state as currently known.
    fn snapshot(&self) -> Self::Game;

    /// Send a decided primitive action, to be executed at `send_time_ms`.
    fn send_action(&mut self, action: &PrimitiveAction, send_time_ms: u64)
        -> Result<(), HostError>;

    /// Wall-clock milliseconds used to stamp dispatched actions.
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Notification from the host about an earlier order or a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// The engine executed the action.
    Accepted(PrimitiveAction),
    /// The engine refused the action.
    Rejected(PrimitiveAction),
    /// The unit was destroyed or left sight.
    UnitVanished(UnitId),
}

/// Cloneable, non-blocking handle host threads use to report events.
#[derive(Clone, Debug)]
pub struct HostEventSender {
    tx: mpsc::Sender<HostEvent>,
}

impl HostEventSender {
    /// Report an event. Never blocks; events sent after the agent stopped
    /// are dropped.
    pub fn send(&self, event: HostEvent) {
        let _ = self.tx.send(event);
    }

    pub fn accepted(&self, action: PrimitiveAction) {
        self.send(HostEvent::Accepted(action));
    }

    pub fn rejected(&self, action: PrimitiveAction) {
        self.send(HostEvent::Rejected(action));
    }

    pub fn vanished(&self, unit: UnitId) {
        self.send(HostEvent::UnitVanished(unit));
    }
}

/// Receiving end owned by the decision loop.
#[derive(Debug)]
pub struct HostEventInbox {
    rx: mpsc::Receiver<HostEvent>,
}

impl HostEventInbox {
    /// Take every event queued so far without waiting.
    pub fn drain(&self) -> Vec<HostEvent> {
        self.rx.try_iter().collect()
    }
}

/// Create a connected sender/inbox pair.
#[must_use]
pub fn host_event_channel() -> (HostEventSender, HostEventInbox) {
    let (tx, rx) = mpsc::channel();
    (HostEventSender { tx }, HostEventInbox { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Position;

    #[test]
    fn test_channel_drains_in_order() {
        let (sender, inbox) = host_event_channel();
        let mv = PrimitiveAction::Move { unit: UnitId(1), to: Position::new(0, 1) };

        let worker = {
            let sender = sender.clone();
            std::thread::spawn(move || {
                sender.rejected(mv);
                sender.vanished(UnitId(2));
            })
        };
        worker.join().unwrap();
        sender.accepted(mv);

        assert_eq!(
            inbox.drain(),
            vec![
                HostEvent::Rejected(mv),
                HostEvent::UnitVanished(UnitId(2)),
                HostEvent::Accepted(mv),
            ]
        );
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn test_send_after_inbox_dropped_is_silent() {
        let (sender, inbox) = host_event_channel();
        drop(inbox);
        sender.vanished(UnitId(3));
    }
}
