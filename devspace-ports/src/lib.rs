//! Host port allocation.
//!
//! Allocation is best-effort: a port is free at the instant it is probed and
//! nothing is reserved until the container engine binds it. Two callers racing
//! for a port can be handed the same number.

pub mod allocator;
pub mod range;

pub use allocator::{EphemeralPortAllocator, PortAllocator, RangePortAllocator};
pub use range::PortRange;
