//! Centralized tolerances. Every epsilon comparison in the sweep algorithm
//! goes through one of these two constants; no other literal tolerance
//! should appear anywhere else in the crate.

/// Tolerance used throughout the sweep for comparing break points and for
/// coalescing circle events that describe the same geometric collapse.
pub const ALGORITHMIC_EPSILON: f64 = 1e-9;

/// Coarser tolerance used by the finalization/edge-closing stage to snap
/// endpoints onto the bounding box boundary, expressed in user units.
pub const BOUNDARY_TOLERANCE: f64 = 1e-2;
