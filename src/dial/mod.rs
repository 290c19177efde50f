//! Rock-paper-scissors power dial
//!
//! Three handles on a circle split a ship's power between engine, weapons
//! and shields in proportion to the arcs between them.

pub mod controller;
pub mod geometry;

pub use controller::{DialController, SegmentPath};
pub use geometry::{Arcs, DialAngles, DialGeometry, Handle, PowerSplit};
