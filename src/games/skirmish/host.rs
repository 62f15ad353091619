//! In-process host for the skirmish game.
//!
//! Orders are buffered on `send_action` and executed against the
//! authoritative game when the owner calls `step`, which also reports
//! acceptance or rejection through the event channel.

use crate::core::{HostError, PlayerId, PrimitiveAction, TimedAction};
use crate::engine::{Host, HostEventSender, Snapshot};

use super::game::SkirmishGame;

/// Authoritative skirmish game driven in-process.
#[derive(Debug)]
pub struct LocalHost {
    game: SkirmishGame,
    player: PlayerId,
    events: HostEventSender,
    inflight: Vec<TimedAction>,
    sent: Vec<TimedAction>,
    closed: bool,
}

impl LocalHost {
    /// Host `game` for the agent playing `player`.
    pub fn new(game: SkirmishGame, player: PlayerId, events: HostEventSender) -> Self {
        Self {
            game,
            player,
            events,
            inflight: Vec::new(),
            sent: Vec::new(),
            closed: false,
        }
    }

    #[must_use]
    pub fn game(&self) -> &SkirmishGame {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut SkirmishGame {
        &mut self.game
    }

    /// Every action sent so far, in send order.
    #[must_use]
    pub fn sent(&self) -> &[TimedAction] {
        &self.sent
    }

    /// Make every later `send_action` fail with `HostError::Closed`.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Execute buffered orders in send-time order, then let the rest of
    /// `delta_ms` pass.
    pub fn step(&mut self, delta_ms: u64) {
        let mut orders = std::mem::take(&mut self.inflight);
        orders.sort_by_key(|o| o.send_time_ms);

        let mut spent = 0;
        for order in orders {
            if self.game.is_valid_action(&order.action, self.player) {
                let now = self.game.game_time_ms();
                self.game.schedule_action(self.player, order.action, now);
                match self.game.advance(1) {
                    Ok(()) => self.events.accepted(order.action),
                    Err(_) => self.events.rejected(order.action),
                }
                spent += 1;
            } else {
                self.events.rejected(order.action);
            }
        }

        if delta_ms > spent {
            // Failures here belong to other players' scheduled orders.
            let _ = self.game.advance(delta_ms - spent);
        }
    }
}

impl Host for LocalHost {
    type Game = SkirmishGame;

    fn snapshot(&self) -> SkirmishGame {
        self.game.copy()
    }

    fn send_action(&mut self, action: &PrimitiveAction, send_time_ms: u64) -> Result<(), HostError> {
        if self.closed {
            return Err(HostError::Closed);
        }
        let order = TimedAction {
            action: *action,
            send_time_ms,
        };
        self.inflight.push(order);
        self.sent.push(order);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Position, UnitId};
    use crate::engine::{host_event_channel, HostEvent};
    use crate::games::skirmish::{SkirmishBuilder, INFANTRY};

    #[test]
    fn test_step_executes_and_reports() {
        let game = SkirmishBuilder::new(3, 3)
            .unit(PlayerId::new(0), INFANTRY, Position::new(0, 0))
            .build();
        let (sender, inbox) = host_event_channel();
        let mut host = LocalHost::new(game, PlayerId::new(0), sender);

        let good = PrimitiveAction::Move { unit: UnitId(1), to: Position::new(1, 0) };
        let bad = PrimitiveAction::Move { unit: UnitId(1), to: Position::new(2, 2) };
        host.send_action(&good, 10).unwrap();
        host.send_action(&bad, 11).unwrap();
        host.step(100);

        assert_eq!(host.sent().len(), 2);
        assert_eq!(host.game().game_time_ms(), 100);
        assert_eq!(host.game().unit(UnitId(1)).unwrap().position, Position::new(1, 0));
        assert_eq!(
            inbox.drain(),
            vec![HostEvent::Accepted(good), HostEvent::Rejected(bad)]
        );
    }

    #[test]
    fn test_closed_host_refuses_orders() {
        let game = SkirmishBuilder::new(2, 2).build();
        let (sender, _inbox) = host_event_channel();
        let mut host = LocalHost::new(game, PlayerId::new(0), sender);
        host.close();

        let order = PrimitiveAction::Move { unit: UnitId(1), to: Position::new(1, 0) };
        assert_eq!(host.send_action(&order, 0), Err(HostError::Closed));
    }
}
