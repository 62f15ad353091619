//! Boundary to the external game-rule engine and transport.
//!
//! The agent is generic over these traits:
//! - `Snapshot`: copy, legality, scheduling, time advance, evaluation and
//!   board queries
//! - `Host`: authoritative snapshots in, primitive actions out
//!
//! `games::skirmish` provides a small reference implementation.

pub mod host;
pub mod snapshot;

pub use host::{host_event_channel, Host, HostEvent, HostEventInbox, HostEventSender};
pub use snapshot::{CityView, Snapshot, UnitView};
