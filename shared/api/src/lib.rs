//! Interface between Winged Dash aircraft and whatever flies them.
//!
//! Every physics tick an aircraft exposes an [`Observation`] and receives one
//! set of [`DiscreteActions`] from an [`ActionSource`]. The source may be a
//! trained policy, a builtin autopilot or a human at the controls (see
//! [`PlayerController`]).
#![warn(missing_docs)]
mod action;
mod observation;
mod player;

pub use action::{ControlInput, DiscreteActions, BRANCH_SIZES, NUM_BRANCHES};
pub use observation::{ActionSource, Observation, OBSERVATION_SIZE};
pub use player::{heuristic, InputAxes, InputDevice, PlayerController};
