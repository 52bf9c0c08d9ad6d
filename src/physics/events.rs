//! Collision Events
//!
//! Enter/Stay/Exit bookkeeping across physics steps. Events are returned
//! from the step rather than pushed through callbacks.

use std::collections::BTreeSet;

use serde::{Serialize, Deserialize};

use super::body::BodyId;
use super::geometry::CollisionInfo;

/// Canonical key for an unordered body pair: `(min << 32) | max`.
#[inline]
pub fn pair_key(a: BodyId, b: BodyId) -> u64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    ((lo as u64) << 32) | hi as u64
}

/// Split a pair key back into `(min, max)`.
#[inline]
pub fn split_pair_key(key: u64) -> (BodyId, BodyId) {
    ((key >> 32) as BodyId, (key & 0xFFFF_FFFF) as BodyId)
}

/// Contact lifecycle stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactPhase {
    /// First frame of contact
    Enter,
    /// Contact continues from last frame
    Stay,
    /// Contact ended this frame
    Exit,
}

/// Event flavor, split by trigger and phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionEventKind {
    /// Solid contact started
    CollisionEnter,
    /// Solid contact continues
    CollisionStay,
    /// Solid contact ended
    CollisionExit,
    /// Trigger overlap started
    TriggerEnter,
    /// Trigger overlap continues
    TriggerStay,
    /// Trigger overlap ended
    TriggerExit,
}

impl CollisionEventKind {
    /// Combine a phase with the trigger flavor.
    pub fn new(phase: ContactPhase, is_trigger: bool) -> Self {
        match (phase, is_trigger) {
            (ContactPhase::Enter, false) => Self::CollisionEnter,
            (ContactPhase::Stay, false) => Self::CollisionStay,
            (ContactPhase::Exit, false) => Self::CollisionExit,
            (ContactPhase::Enter, true) => Self::TriggerEnter,
            (ContactPhase::Stay, true) => Self::TriggerStay,
            (ContactPhase::Exit, true) => Self::TriggerExit,
        }
    }

    /// Lifecycle stage.
    pub fn phase(self) -> ContactPhase {
        match self {
            Self::CollisionEnter | Self::TriggerEnter => ContactPhase::Enter,
            Self::CollisionStay | Self::TriggerStay => ContactPhase::Stay,
            Self::CollisionExit | Self::TriggerExit => ContactPhase::Exit,
        }
    }

    /// Whether this is a trigger event.
    pub fn is_trigger(self) -> bool {
        matches!(self, Self::TriggerEnter | Self::TriggerStay | Self::TriggerExit)
    }
}

/// A collision event raised by one physics step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionEvent {
    /// Flavor and phase
    pub kind: CollisionEventKind,
    /// First body. Narrowphase order for Enter/Stay, lower id for Exit.
    pub body_a: BodyId,
    /// Second body
    pub body_b: BodyId,
    /// Contact data; `None` for Exit
    pub contact: Option<CollisionInfo>,
    /// Frame that raised the event
    pub frame: u64,
}

impl CollisionEvent {
    /// Whether this is a trigger event.
    #[inline]
    pub fn is_trigger(&self) -> bool {
        self.kind.is_trigger()
    }

    /// Lifecycle stage.
    #[inline]
    pub fn phase(&self) -> ContactPhase {
        self.kind.phase()
    }

    /// Whether `id` is one of the two bodies.
    #[inline]
    pub fn involves(&self, id: BodyId) -> bool {
        self.body_a == id || self.body_b == id
    }

    /// The body paired with `id`, if `id` is part of the event.
    pub fn other(&self, id: BodyId) -> Option<BodyId> {
        if self.body_a == id {
            Some(self.body_b)
        } else if self.body_b == id {
            Some(self.body_a)
        } else {
            None
        }
    }
}

/// Tracks which pairs touched last frame.
#[derive(Clone, Debug, Default)]
pub struct ContactTracker {
    previous: BTreeSet<u64>,
    current: BTreeSet<u64>,
}

impl ContactTracker {
    /// Empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs in contact after the last update.
    pub fn active_pairs(&self) -> impl Iterator<Item = (BodyId, BodyId)> + '_ {
        self.previous.iter().map(|&key| split_pair_key(key))
    }

    /// Turn this frame's contacts into events.
    ///
    /// Each pair yields at most one Enter/Stay per frame, even if the
    /// broadphase reported it several times. Exits follow in ascending key
    /// order; `exit_trigger` returns the pair's trigger flavor, or `None`
    /// when either body no longer exists (the exit is then dropped).
    pub fn update<F>(&mut self, frame: u64, contacts: &[CollisionInfo], exit_trigger: F) -> Vec<CollisionEvent>
    where
        F: Fn(BodyId, BodyId) -> Option<bool>,
    {
        let mut events = Vec::with_capacity(contacts.len());
        self.current.clear();

        for info in contacts {
            let key = pair_key(info.body_a, info.body_b);
            if !self.current.insert(key) {
                continue;
            }

            let phase = if self.previous.contains(&key) {
                ContactPhase::Stay
            } else {
                ContactPhase::Enter
            };

            events.push(CollisionEvent {
                kind: CollisionEventKind::new(phase, info.is_trigger_pair),
                body_a: info.body_a,
                body_b: info.body_b,
                contact: Some(*info),
                frame,
            });
        }

        for &key in self.previous.difference(&self.current) {
            let (a, b) = split_pair_key(key);
            let Some(is_trigger) = exit_trigger(a, b) else {
                continue;
            };
            events.push(CollisionEvent {
                kind: CollisionEventKind::new(ContactPhase::Exit, is_trigger),
                body_a: a,
                body_b: b,
                contact: None,
                frame,
            });
        }

        std::mem::swap(&mut self.previous, &mut self.current);
        self.current.clear();

        events
    }

    /// Forget all contact history.
    pub fn clear(&mut self) {
        self.previous.clear();
        self.current.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================
