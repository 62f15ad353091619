//! Queue operations: enqueue, ready-step repair, dispatch, simulated drain
//! and host corrections.

use std::collections::VecDeque;

use tracing::{debug, info, trace};

use crate::core::{
    AgentConfig, PlayerId, Position, PrimitiveAction, ResolveError, TimedAction, UnitId,
};
use crate::engine::{HostEvent, Snapshot};
use crate::macros::{resolve, MacroAction};

use super::command::Command;
use super::state::{AgentState, ProductionMap, UnitStatus};

/// How `enqueue` placed a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// New single-entry queue.
    Created,
    /// Queued behind existing commands.
    Appended,
    /// Forced: replaced the front command.
    Replaced,
    /// Already in effect; nothing queued.
    Suppressed,
}

/// Resolve `action` and queue it for `player`.
///
/// Build goes to the city's queue only when it changes the city's assigned
/// production. Move, Attack and Explore go to the unit's queue: a forced
/// action replaces the front command, otherwise it is appended. The unit is
/// marked committed.
pub fn enqueue<S: Snapshot>(
    state: &mut AgentState,
    action: MacroAction,
    snapshot: &S,
    player: PlayerId,
) -> Result<EnqueueOutcome, ResolveError> {
    let resolution = resolve(action, snapshot, player, &state.production)?;

    if let MacroAction::Build { city, unit_type } = action {
        if resolution.is_empty() {
            trace!(%city, %unit_type, "production already assigned");
            return Ok(EnqueueOutcome::Suppressed);
        }
        state.production.assign(city, unit_type);
        let queue = state.queues.cities.entry(city).or_default();
        let outcome = if queue.is_empty() {
            EnqueueOutcome::Created
        } else {
            EnqueueOutcome::Appended
        };
        queue.push_back(Command::new(resolution, player));
        return Ok(outcome);
    }

    let Some(unit) = action.unit() else {
        return Ok(EnqueueOutcome::Suppressed);
    };
    let command = Command::new(resolution, player);
    let queue = state.queues.units.entry(unit).or_default();
    let outcome = if queue.is_empty() {
        queue.push_back(command);
        EnqueueOutcome::Created
    } else if action.is_forced() {
        queue.pop_front();
        queue.push_front(command);
        EnqueueOutcome::Replaced
    } else {
        queue.push_back(command);
        EnqueueOutcome::Appended
    };
    state.set_status(unit, UnitStatus::Committed);
    Ok(outcome)
}

enum Repair {
    Spliced,
    Drop,
}

/// Front step of `unit`'s queue if it is legal now, repairing or dropping
/// stale commands on the way. The step is not removed.
///
/// An illegal front step sends the command through `repair`. A rebuilt
/// command whose new front step is legal is kept; anything else is dropped
/// and the next command is tried.
pub fn peek_ready<S: Snapshot>(
    state: &mut AgentState,
    unit: UnitId,
    snapshot: &S,
    player: PlayerId,
) -> Option<PrimitiveAction> {
    let AgentState {
        queues, production, ..
    } = state;

    loop {
        let Some(queue) = queues.units.get_mut(&unit) else {
            return None;
        };
        let Some(command) = queue.front_mut() else {
            queues.units.remove(&unit);
            return None;
        };
        let Some(&step) = command.front() else {
            queue.pop_front();
            continue;
        };
        if snapshot.is_valid_action(&step, player) {
            return Some(step);
        }

        match repair(command, snapshot, player, production) {
            Repair::Spliced => {
                if let Some(&step) = command.front() {
                    if snapshot.is_valid_action(&step, player) {
                        debug!(%unit, command = %command, "replanned stale command");
                        return Some(step);
                    }
                }
                queue.pop_front();
            }
            Repair::Drop => {
                debug!(%unit, command = %command, "dropping stale command");
                queue.pop_front();
            }
        }
    }
}

/// Rebuild a command whose front step went stale.
///
/// The remaining move steps are checked against current knowledge first: a
/// known blocked cell at the end of a Move or Explore means the destination
/// is gone, so the command is dropped. Otherwise Move and Explore are
/// replanned as a fresh Move to the same destination, and Attack is
/// resolved again against the target's current position.
fn repair<S: Snapshot>(
    command: &mut Command,
    snapshot: &S,
    player: PlayerId,
    production: &ProductionMap,
) -> Repair {
    let blocked = command.steps.iter().find_map(|step| match *step {
        PrimitiveAction::Move { to, .. }
            if matches!(snapshot.is_known(to), Ok(true))
                && matches!(snapshot.is_movement_possible(to, player), Ok(false)) =>
        {
            Some(to)
        }
        _ => None,
    });

    let replan = match command.action {
        MacroAction::Move { unit, .. } | MacroAction::Explore { unit } => {
            let Some(destination) = command.final_destination() else {
                return Repair::Drop;
            };
            if blocked == Some(destination) {
                return Repair::Drop;
            }
            MacroAction::Move {
                unit,
                destination,
                force: false,
            }
        }
        MacroAction::Attack { .. } => command.action,
        MacroAction::Build { .. } => return Repair::Drop,
    };

    match resolve(replan, snapshot, player, production) {
        Ok(resolution) if !resolution.is_empty() => {
            *command = Command::new(resolution, command.owner);
            Repair::Spliced
        }
        Ok(_) => Repair::Drop,
        Err(err) => {
            debug!(action = %replan, error = %err, "replanning failed");
            Repair::Drop
        }
    }
}

/// Front step of `city`'s queue if it is legal now. A step that is not yet
/// legal stays queued.
pub fn peek_ready_city<S: Snapshot>(
    state: &mut AgentState,
    city: Position,
    snapshot: &S,
    player: PlayerId,
) -> Option<PrimitiveAction> {
    let queue = state.queues.cities.get_mut(&city)?;
    while queue.front().is_some_and(Command::is_finished) {
        queue.pop_front();
    }
    let step = *queue.front()?.front()?;
    snapshot.is_valid_action(&step, player).then_some(step)
}

/// Pop one ready step per eligible unit and city.
///
/// Units are visited in id order, then cities in position order. Units of
/// a fast type are eligible every turn; everything else only on slow turns.
/// Send times start at `base_ms + dispatch_offset_ms` and grow by one per
/// action.
pub fn dispatch_batch<S: Snapshot>(
    state: &mut AgentState,
    snapshot: &S,
    player: PlayerId,
    turn: u64,
    base_ms: u64,
    config: &AgentConfig,
) -> Vec<TimedAction> {
    let slow_turn = config.is_slow_turn(turn);
    let mut send_time = base_ms + config.dispatch_offset_ms;
    let mut batch = Vec::new();

    for unit in state.queues.queued_units() {
        let fast = snapshot
            .unit(unit)
            .is_some_and(|u| config.fast_unit_types.contains(&u.unit_type));
        if !fast && !slow_turn {
            continue;
        }
        let Some(step) = peek_ready(state, unit, snapshot, player) else {
            if !state.queues.has_unit_queue(unit) {
                state.set_status(unit, UnitStatus::Idle);
            }
            continue;
        };
        pop_unit_step(state, unit);
        batch.push(TimedAction {
            action: step,
            send_time_ms: send_time,
        });
        send_time += 1;
    }

    if slow_turn {
        for city in state.queues.queued_cities() {
            let Some(step) = peek_ready_city(state, city, snapshot, player) else {
                continue;
            };
            pop_city_step(state, city);
            batch.push(TimedAction {
                action: step,
                send_time_ms: send_time,
            });
            send_time += 1;
        }
    }

    if !batch.is_empty() {
        debug!(turn, count = batch.len(), "dispatching batch");
    }
    batch
}

fn pop_unit_step(state: &mut AgentState, unit: UnitId) -> Option<PrimitiveAction> {
    let queue = state.queues.units.get_mut(&unit)?;
    let command = queue.front_mut()?;
    let step = command.pop_step();
    if command.is_finished() {
        queue.pop_front();
    }
    if queue.is_empty() {
        state.queues.units.remove(&unit);
        state.set_status(unit, UnitStatus::Idle);
    } else {
        state.set_status(unit, UnitStatus::Committed);
    }
    step
}

fn pop_city_step(state: &mut AgentState, city: Position) -> Option<(PlayerId, PrimitiveAction)> {
    let queue = state.queues.cities.get_mut(&city)?;
    let command = queue.front_mut()?;
    let owner = command.owner;
    let step = command.pop_step();
    if command.is_finished() {
        queue.pop_front();
    }
    if queue.is_empty() {
        state.queues.cities.remove(&city);
    }
    step.map(|s| (owner, s))
}

/// Play every queued command out on a simulated snapshot.
///
/// Each round pops the front step of every unit and city queue, schedules
/// the legal ones one millisecond ahead and advances the snapshot by
/// `pace_ms`. Rounds repeat until one pops nothing. Advance failures are
/// expected under partial information and ignored. Returns the number of
/// steps popped.
pub fn drain_simulated<S: Snapshot>(state: &mut AgentState, snapshot: &mut S, pace_ms: u64) -> usize {
    let mut popped = 0;
    loop {
        let mut round: Vec<(PlayerId, PrimitiveAction)> = Vec::new();

        for unit in state.queues.queued_units() {
            let owner = state
                .queues
                .unit_queue(unit)
                .and_then(VecDeque::front)
                .map(|c| c.owner);
            if let (Some(owner), Some(step)) = (owner, pop_unit_step(state, unit)) {
                round.push((owner, step));
            }
        }
        for city in state.queues.queued_cities() {
            if let Some(entry) = pop_city_step(state, city) {
                round.push(entry);
            }
        }

        if round.is_empty() {
            return popped;
        }
        popped += round.len();

        let at = snapshot.game_time_ms() + 1;
        for (owner, step) in round {
            if snapshot.is_valid_action(&step, owner) {
                snapshot.schedule_action(owner, step, at);
            }
        }
        if let Err(err) = snapshot.advance(pace_ms) {
            trace!(error = %err, "simulated step failed");
        }
    }
}

/// Apply a host notification to the real shadow state.
///
/// Returns whether anything changed, so repeated notifications about the
/// same unit or city within a cycle count once.
pub fn apply_host_event(state: &mut AgentState, event: &HostEvent) -> bool {
    match *event {
        HostEvent::Accepted(action) => {
            trace!(%action, "accepted");
            false
        }
        HostEvent::Rejected(PrimitiveAction::Produce { city, .. }) => {
            let cleared = state.production.clear(city);
            if cleared {
                info!(%city, "production rejected, assignment cleared");
            }
            cleared
        }
        HostEvent::Rejected(action) => {
            let Some(unit) = action.unit() else {
                return false;
            };
            let previous = state.set_status(unit, UnitStatus::Idle);
            let changed = previous != UnitStatus::Idle;
            if changed {
                info!(%unit, %action, "action rejected, unit set idle");
            }
            changed
        }
        HostEvent::UnitVanished(unit) => {
            let forgotten = state.forget_unit(unit);
            if forgotten {
                info!(%unit, "unit vanished");
            }
            forgotten
        }
    }
}
