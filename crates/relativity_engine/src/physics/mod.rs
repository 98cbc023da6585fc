//! Special-relativistic kinematics
//!
//! Everything here is pure math on the observer's rest frame: no rendering
//! state, no allocation.

pub mod retarded;

pub use retarded::{
    lorentz_factor, resolve_emission, solve_retarded_event, EmissionEvent,
    RetardedEvent, SolverError, Worldline, MIN_BETA2,
};
