//! High-level plugin composition.
//!
//! The gameplay plugins are a pure simulation: they consume logical input intents and level
//! documents, and expose session values and lifecycle events. The presentation plugins are the
//! host layer around them (window, sprites, HUD, audio playback, keyboard polling). Keeping
//! the two registrations separate lets integration tests drive the simulation headless.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use crate::audio::{GameAudioPlugin, PlayCue};
use crate::camera::CameraPlugin;
use crate::collision::CollisionPlugin;
use crate::enemy::EnemyPlugin;
use crate::level::LevelPlugin;
use crate::physics::PhysicsPlugin;
use crate::player::{self, PlayerPlugin};
use crate::render::VisualsPlugin;
use crate::session::SessionPlugin;
use crate::state::{GameSet, GameState};
use crate::transition::TransitionPlugin;
use crate::ui::UiPlugin;

/// Everything the binary needs on top of `DefaultPlugins`.
pub struct MallardPlatformerPlugin;

impl Plugin for MallardPlatformerPlugin {
    fn build(&self, app: &mut App) {
        configure_gameplay(app);
        configure_presentation(app);
    }
}

/// Simulation-only wiring. Runs without windows, rendering, or real time.
pub fn configure_gameplay(app: &mut App) {
    app.init_state::<GameState>()
        .add_event::<PlayCue>()
        .add_plugins((
            LevelPlugin,      // Level documents -> entity sets.
            PhysicsPlugin,    // AABB bodies + integrator.
            CollisionPlugin,  // Solid resolution.
            PlayerPlugin,     // Input intents + mallard state machine.
            EnemyPlugin,      // Pigeon patrol.
            SessionPlugin,    // Overlap triggers + session values.
            TransitionPlugin, // Deferred level switches.
        ))
        // One frame step = physics, collisions, input, state machines, session
        // bookkeeping, in that order, every time.
        .configure_sets(
            Update,
            (
                GameSet::Physics,
                GameSet::Collisions,
                GameSet::Input,
                GameSet::EntityState,
                GameSet::Session,
            )
                .chain()
                .run_if(in_state(GameState::Playing)),
        );
}

/// Host-side wiring: rendering, HUD, audio playback, and input device polling.
pub fn configure_presentation(app: &mut App) {
    app.add_plugins((GameAudioPlugin, CameraPlugin, VisualsPlugin, UiPlugin))
        .add_systems(Update, player::poll_keyboard.before(GameSet::Input));
}

/// Minimal configuration for integration tests: state machinery plus a manually advanced
/// `Time`, no default plugins.
pub fn configure_headless(app: &mut App) {
    app.add_plugins(StatesPlugin).init_resource::<Time>();
    configure_gameplay(app);
}
