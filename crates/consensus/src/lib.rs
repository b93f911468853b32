//! Round-based consensus subrounds.
//!
//! A consensus round is a fixed wall-clock window divided into ordered
//! subrounds; each subround has a job, a completion check, and a grace
//! extension hook. This crate implements the per-round shared state and the
//! Block subround, in which the round's leader builds, signs, and broadcasts
//! the candidate block while every other member of the consensus group
//! receives and validates it.
//!
//! # Architecture
//!
//! The subround driver is synchronous and cooperative:
//!
//! - The host round driver calls [`BlockSubround::job`] once per tick while
//!   the subround window is open, and polls [`BlockSubround::check`] to
//!   decide completion.
//! - The transport feeds decoded consensus messages into the three receive
//!   handlers; every handler returns a plain `bool` and never panics across
//!   the boundary.
//! - Long collaborator calls (block creation, block processing) are bounded
//!   by time predicates derived from the round clock; there is no internal
//!   task spawning and no async.
//!
//! Shared per-round state lives in [`ConsensusState`] behind a mutex. Its
//! accessors enforce the round's monotonicity rules (write-once artifacts,
//! job-done bits that never clear, status that only moves forward), so a
//! misbehaving caller cannot rewind consensus by accident.

mod block;
mod error;
mod state;
mod subround;

#[cfg(test)]
mod testkit;

pub use block::{BlockSubround, BlockSubroundConfig, ConsensusServices};
pub use error::HeaderError;
pub use state::{ConsensusState, SubroundId, SubroundStatus};
pub use subround::Subround;
