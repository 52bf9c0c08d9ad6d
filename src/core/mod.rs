//! Core deterministic primitives.
//!
//! All types in this module are designed for bit-exact cross-platform
//! determinism. No floating point is stored in simulation state.

pub mod fixed;
pub mod vec3;
pub mod hash;

// Re-export core types
pub use fixed::{Fix64, FixedError};
pub use vec3::FixedVector3;
pub use hash::{compute_state_hash, StateHash, StateHasher};
