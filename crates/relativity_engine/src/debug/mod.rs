//! Debug visualization

pub mod markers;

pub use markers::{DebugMarker, MarkerKind};
