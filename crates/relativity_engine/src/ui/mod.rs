//! On-screen text

pub mod overlay;

pub use overlay::{Overlay, OverlaySlot};
