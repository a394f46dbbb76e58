//! Shared harness for the scenario tests: a headless app over the gameplay plugins with a
//! manually advanced clock, so every run steps the same deterministic frames.
#![allow(dead_code)]

use std::time::Duration;

use bevy::prelude::*;
use mallard_platformer::app::configure_headless;
use mallard_platformer::level::LevelCatalog;

pub const DT: f32 = 1.0 / 60.0;

/// Builds the app without stepping it, so tests can override resources (session state,
/// input intents) before the first frame. Call [`boot`] to spawn the level and enter play.
pub fn app_with(levels: &[&str]) -> App {
    let mut app = App::new();
    app.insert_resource(LevelCatalog::new(
        levels.iter().map(|doc| (*doc).to_owned()).collect(),
    ));
    configure_headless(&mut app);
    app
}

/// Two frames bring the app into `Playing`: the first spawns the level while still loading,
/// the second applies the state switch and runs the first gameplay frame.
pub fn boot(app: &mut App) {
    run_frames(app, 2);
}

pub fn step(app: &mut App, dt: f32) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(dt));
    app.update();
}

pub fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        step(app, DT);
    }
}

pub fn run_secs(app: &mut App, secs: f32) {
    run_frames(app, (secs / DT).ceil() as usize);
}

pub fn count<C: Component>(app: &mut App) -> usize {
    let world = app.world_mut();
    world.query::<&C>().iter(world).count()
}
