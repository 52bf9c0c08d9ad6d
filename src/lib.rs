//! # Lane Battle Core
//!
//! Deterministic combat simulation for a two-sided lane battler.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    LANE BATTLE CORE                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q32.32 fixed-point arithmetic             │
//! │  ├── vec3.rs     - 3D vector with fixed-point                │
//! │  └── hash.rs     - State hashing for replay comparison       │
//! │                                                              │
//! │  physics/        - Rigid bodies and collision                │
//! │  ├── body.rs     - Bodies and colliders                      │
//! │  ├── geometry.rs - AABBs and narrowphase tests               │
//! │  ├── grid.rs     - Uniform grid broadphase                   │
//! │  ├── layers.rs   - Collision layers and matrix               │
//! │  ├── events.rs   - Enter/stay/exit contact tracking          │
//! │  └── world.rs    - Fixed-step pipeline                       │
//! │                                                              │
//! │  game/           - Match rules                               │
//! │  ├── config.rs   - Tuning and JSON loading                   │
//! │  ├── entity.rs   - Towers, units, projectiles                │
//! │  ├── sim.rs      - Authoritative tick loop                   │
//! │  └── snapshot.rs - Per-tick state view                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Everything under `core/`, `physics/` and `game/` is bit-exact:
//! - No floating-point arithmetic in simulation state
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//!
//! Given the same config, two runs produce identical snapshots on any
//! platform.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod physics;

// Re-export commonly used types
pub use core::fixed::Fix64;
pub use core::vec3::FixedVector3;
pub use game::config::SimConfig;
pub use game::sim::{BattleSim, MatchOutcome};
pub use game::snapshot::Snapshot;
pub use physics::world::PhysicsWorld;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
