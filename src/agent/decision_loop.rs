//! The real-time control loop.
//!
//! One cycle: apply host corrections, project a copy of the game forward
//! past the orders still in flight, search it, enqueue the decision, sleep
//! out the period, then dispatch the next ready steps.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, trace, warn};

use crate::command::{apply_host_event, dispatch_batch, enqueue, AgentState, EnqueueOutcome};
use crate::core::{AgentConfig, AgentError, PlayerId, TimedAction};
use crate::engine::{Host, HostEvent, HostEventInbox, Snapshot};
use crate::macros::MacroAction;
use crate::mcts::{MctsSearch, SearchBudget};

use super::shutdown::ShutdownHandle;

/// What one cycle did.
#[derive(Clone, Debug, PartialEq)]
pub struct CycleReport {
    /// Turn counter the cycle ran as.
    pub turn: u64,

    /// Search iterations completed.
    pub iterations: u32,

    /// Macro-action decided for the agent, if any.
    pub decision: Option<MacroAction>,

    /// The decision came from the random fallback.
    pub fallback: bool,

    /// How the decision was placed in the real queues.
    pub enqueued: Option<EnqueueOutcome>,

    /// Primitive actions sent to the host, in send order.
    pub dispatched: Vec<TimedAction>,

    /// Host events that changed shadow state.
    pub corrections: usize,

    /// Replayed actions that failed on the projected copy.
    pub replay_failures: usize,

    /// Wall-clock time of the whole cycle, sleep included.
    pub elapsed: Duration,
}

/// Drives one player through a host, one decision per fixed period.
///
/// The loop is the only writer of the real `AgentState`. Host threads
/// report through the event channel and their notices are applied at the
/// start of the next cycle.
pub struct DecisionLoop<H: Host> {
    host: H,
    player: PlayerId,
    config: AgentConfig,
    state: AgentState,
    search: MctsSearch,
    inbox: HostEventInbox,
    /// Sent last cycle and not yet acknowledged.
    in_flight: Vec<TimedAction>,
    turn: u64,
    shutdown: ShutdownHandle,
}

impl<H: Host> DecisionLoop<H> {
    /// Create a loop for `player`, reading host notices from `inbox`.
    pub fn new(host: H, player: PlayerId, config: AgentConfig, inbox: HostEventInbox) -> Self {
        let search = MctsSearch::new(config.mcts.clone()).with_random_fallback(config.random_fallback);
        Self {
            host,
            player,
            config,
            state: AgentState::new(),
            search,
            inbox,
            in_flight: Vec::new(),
            turn: 0,
            shutdown: ShutdownHandle::new(),
        }
    }

    /// Handle another thread can use to stop `run`.
    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The real shadow state.
    #[must_use]
    pub fn state(&self) -> &AgentState {
        &self.state
    }

    /// Mutable shadow state, for seeding plans before the first cycle.
    pub fn state_mut(&mut self) -> &mut AgentState {
        &mut self.state
    }

    #[must_use]
    pub fn player(&self) -> PlayerId {
        self.player
    }

    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Turns completed so far.
    #[must_use]
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Actions sent last cycle the host has not acknowledged.
    #[must_use]
    pub fn in_flight(&self) -> &[TimedAction] {
        &self.in_flight
    }

    /// Run cycles until shutdown is requested or the game ends.
    ///
    /// Returns the number of completed turns. A fatal error ends the loop
    /// immediately; the state it leaves behind is not reused.
    pub fn run(&mut self) -> Result<u64, AgentError> {
        info!(player = %self.player, pace_ms = self.config.decision_pace_ms, "decision loop started");

        while !self.shutdown.is_requested() {
            if self.host.snapshot().is_game_over() {
                info!(turn = self.turn, "game over");
                break;
            }
            if let Err(err) = self.run_cycle() {
                error!(turn = self.turn, error = %err, "decision loop aborted");
                return Err(err);
            }
        }

        info!(turns = self.turn, "decision loop stopped");
        Ok(self.turn)
    }

    /// Run one decision cycle.
    pub fn run_cycle(&mut self) -> Result<CycleReport, AgentError> {
        let cycle_start = Instant::now();
        let turn = self.turn;
        trace!(turn, "cycle start");

        let corrections = self.apply_corrections();

        let mut projected = self.host.snapshot();
        let replay_failures = self.replay_in_flight(&mut projected);

        let deadline = Instant::now() + Duration::from_millis(self.config.decision_pace_ms);
        let decision = self.search.search(
            &projected,
            self.player,
            &self.state,
            SearchBudget::until(deadline),
        )?;

        let enqueued = match decision.action {
            Some(action) => match enqueue(&mut self.state, action, &projected, self.player) {
                Ok(outcome) => {
                    debug!(turn, %action, ?outcome, "enqueued decision");
                    Some(outcome)
                }
                Err(err) => {
                    info!(turn, %action, error = %err, "decision could not be resolved");
                    None
                }
            },
            None => None,
        };

        let period_end = cycle_start + Duration::from_millis(self.config.cycle_ms());
        if let Some(remaining) = period_end.checked_duration_since(Instant::now()) {
            thread::sleep(remaining);
        }

        let dispatched = self.dispatch(turn, &projected)?;
        self.turn += 1;

        let report = CycleReport {
            turn,
            iterations: decision.stats.iterations,
            decision: decision.action,
            fallback: decision.fallback,
            enqueued,
            dispatched,
            corrections,
            replay_failures,
            elapsed: cycle_start.elapsed(),
        };
        debug!(
            turn,
            iterations = report.iterations,
            dispatched = report.dispatched.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "cycle finished"
        );
        Ok(report)
    }

    /// Apply every queued host notice. Acknowledged actions leave the
    /// in-flight list. Returns how many notices changed shadow state.
    fn apply_corrections(&mut self) -> usize {
        let mut changed = 0;
        for event in self.inbox.drain() {
            if let HostEvent::Accepted(action) | HostEvent::Rejected(action) = event {
                if let Some(i) = self.in_flight.iter().position(|t| t.action == action) {
                    self.in_flight.remove(i);
                }
            }
            if apply_host_event(&mut self.state, &event) {
                changed += 1;
            }
        }
        changed
    }

    /// Replay unacknowledged orders on the projected copy and advance it by
    /// exactly one cycle. A replay failure goes through the rejection path.
    ///
    /// The cycle is split evenly over the orders still valid on the copy;
    /// orders that are already stale get no share of it. The last order's
    /// slice absorbs the division remainder.
    fn replay_in_flight(&mut self, projected: &mut H::Game) -> usize {
        let budget = self.config.cycle_ms();
        let pending: Vec<TimedAction> = self
            .in_flight
            .iter()
            .copied()
            .filter(|t| projected.is_valid_action(&t.action, self.player))
            .collect();

        if pending.is_empty() {
            if let Err(err) = projected.advance(budget) {
                trace!(error = %err, "projection advance failed");
            }
            return 0;
        }

        let count = pending.len() as u64;
        let slice = budget / count;
        let mut failures = 0;
        for (offset, order) in (1..).zip(&pending) {
            let at = projected.game_time_ms() + offset;
            projected.schedule_action(self.player, order.action, at);
            let step = if offset == count { budget - slice * (count - 1) } else { slice };
            let Err(failed) = projected.advance(step) else {
                continue;
            };
            // Other players' scheduled orders can fail too; those are not ours
            // to repair.
            if pending.iter().any(|t| t.action == failed.action) {
                warn!(action = %failed.action, reason = %failed.reason, "replayed action failed");
                apply_host_event(&mut self.state, &HostEvent::Rejected(failed.action));
                failures += 1;
            } else {
                trace!(error = %failed, "projection advance failed");
            }
        }
        failures
    }

    /// Send the next ready steps. Legality is judged on the projection, the
    /// state the host will be in once the in-flight orders have run.
    fn dispatch(&mut self, turn: u64, projected: &H::Game) -> Result<Vec<TimedAction>, AgentError> {
        let base = self.host.now_ms();
        let batch = dispatch_batch(&mut self.state, projected, self.player, turn, base, &self.config);

        for order in &batch {
            self.host.send_action(&order.action, order.send_time_ms)?;
        }
        self.in_flight = batch.clone();
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::UnitStatus;
    use crate::core::{Position, PrimitiveAction, UnitId};
    use crate::engine::host_event_channel;
    use crate::games::skirmish::{LocalHost, SkirmishBuilder, INFANTRY};
    use crate::mcts::MctsConfig;

    const P0: PlayerId = PlayerId::new(0);

    fn fast_config() -> AgentConfig {
        AgentConfig::default()
            .with_decision_pace(15)
            .with_macro_action_calc(5)
            .with_mcts(MctsConfig::default().with_simulation_depth(3))
    }

    fn duel_loop() -> DecisionLoop<LocalHost> {
        let game = SkirmishBuilder::new(5, 5)
            .unit(P0, INFANTRY, Position::new(0, 0))
            .unit(PlayerId::new(1), INFANTRY, Position::new(4, 4))
            .build();
        let (sender, inbox) = host_event_channel();
        let host = LocalHost::new(game, P0, sender);
        DecisionLoop::new(host, P0, fast_config(), inbox)
    }

    fn seed_attack(agent: &mut DecisionLoop<LocalHost>) {
        let game = agent.host().snapshot();
        let attack = MacroAction::Attack {
            unit: UnitId(1),
            target: UnitId(2),
            force: false,
        };
        enqueue(agent.state_mut(), attack, &game, P0).unwrap();
    }

    #[test]
    fn test_first_cycle_decides_and_paces() {
        let mut agent = duel_loop();
        let report = agent.run_cycle().unwrap();

        assert_eq!(report.turn, 0);
        assert_eq!(agent.turn(), 1);
        assert!(report.decision.is_some());
        assert!(report.elapsed >= Duration::from_millis(20));
        assert_eq!(agent.in_flight(), report.dispatched.as_slice());
        assert_eq!(agent.host().sent(), report.dispatched.as_slice());
    }

    #[test]
    fn test_seeded_plan_is_dispatched() {
        let mut agent = duel_loop();
        seed_attack(&mut agent);

        let report = agent.run_cycle().unwrap();

        assert!(!report.dispatched.is_empty());
        assert!(matches!(
            report.dispatched[0].action,
            PrimitiveAction::Move { unit: UnitId(1), .. }
        ));
    }

    #[test]
    fn test_accepted_actions_leave_in_flight() {
        let mut agent = duel_loop();
        seed_attack(&mut agent);
        agent.run_cycle().unwrap();
        assert!(!agent.in_flight().is_empty());

        agent.host_mut().step(10);
        let accepted = agent.in_flight().to_vec();
        agent.apply_corrections();

        for order in accepted {
            assert!(!agent.in_flight().contains(&order));
        }
    }

    #[test]
    fn test_repeated_rejection_counts_once() {
        let mut agent = duel_loop();
        let (sender, inbox) = host_event_channel();
        agent.inbox = inbox;
        agent.state.set_status(UnitId(1), UnitStatus::Committed);

        let mv = PrimitiveAction::Move {
            unit: UnitId(1),
            to: Position::new(0, 1),
        };
        sender.rejected(mv);
        sender.rejected(mv);

        assert_eq!(agent.apply_corrections(), 1);
        assert_eq!(agent.state().status(UnitId(1)), UnitStatus::Idle);
    }

    #[test]
    fn test_replay_spans_exactly_one_cycle() {
        let game = SkirmishBuilder::new(5, 5)
            .unit(P0, INFANTRY, Position::new(0, 0))
            .unit(P0, INFANTRY, Position::new(2, 2))
            .unit(PlayerId::new(1), INFANTRY, Position::new(4, 4))
            .build();
        let (sender, inbox) = host_event_channel();
        let mut agent = DecisionLoop::new(LocalHost::new(game, P0, sender), P0, fast_config(), inbox);
        let cycle_ms = agent.config().cycle_ms();

        let order = |unit, x, y| TimedAction {
            action: PrimitiveAction::Move { unit: UnitId(unit), to: Position::new(x, y) },
            send_time_ms: 0,
        };
        // Three orders are valid up front; the last one goes stale once its
        // predecessor has run. The unknown unit's order is skipped.
        agent.in_flight = vec![order(1, 1, 0), order(2, 2, 1), order(2, 3, 2), order(9, 0, 1)];

        let mut projected = agent.host().snapshot();
        let failures = agent.replay_in_flight(&mut projected);

        assert_eq!(failures, 1);
        assert_eq!(projected.game_time_ms(), cycle_ms);
        assert_eq!(projected.unit(UnitId(1)).unwrap().position, Position::new(1, 0));
        assert_eq!(projected.unit(UnitId(2)).unwrap().position, Position::new(2, 1));
    }

    #[test]
    fn test_closed_host_is_fatal() {
        let mut agent = duel_loop();
        seed_attack(&mut agent);
        agent.host_mut().close();

        let err = agent.run().unwrap_err();
        assert!(matches!(err, AgentError::Host(_)));
        assert_eq!(agent.turn(), 0);
    }

    #[test]
    fn test_shutdown_before_run() {
        let mut agent = duel_loop();
        agent.shutdown_handle().request();

        assert_eq!(agent.run().unwrap(), 0);
        assert!(agent.host().sent().is_empty());
    }
}
