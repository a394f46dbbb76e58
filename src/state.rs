//! Global game state definitions. States are stored by Bevy in a stack; switching states simply
//! updates an enum value and triggers on-enter/on-exit schedules.

use bevy::prelude::*;

/// High-level state machine for the session lifecycle. A level swap passes through `Loading`
/// (despawn old world, spawn new one) and back to `Playing`. The level-complete and player-dead
/// phases live in `TransitionState` rather than here, so the world keeps simulating while an
/// exit-animation window runs.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

/// Named system sets structuring the Update schedule. Chained in this order so that overlap
/// predicates observe post-resolution touching flags, and velocity written from input is
/// integrated on the following frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameSet {
    /// Gravity + velocity integration, world-bounds clamping.
    Physics,
    /// Solid resolution, then overlap triggers.
    Collisions,
    /// Logical input intents applied to the player.
    Input,
    /// Per-entity state machines re-derive their logical state.
    EntityState,
    /// Session bookkeeping and deferred level switches.
    Session,
}
