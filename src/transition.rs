//! Deferred level transitions. A transition request raised mid-frame (door entry, player death)
//! is recorded here and only takes effect once its window elapses, at the end of a frame step;
//! nothing swaps state from inside an overlap handler.
//!
//! The windows double as the presentation timings: the door-entry slide and the death animation
//! are read off this resource by the render layer, while the simulation alone decides when the
//! level actually advances.

use bevy::prelude::*;

use crate::player::Mallard;
use crate::session::{EntityRemoved, LevelCompleted, PlayerDied, SessionState};
use crate::state::{GameSet, GameState};

pub const DOOR_ENTRY_SECS: f32 = 0.5;
pub const FADE_SECS: f32 = 0.5;
pub const DEATH_SECS: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Door entered: slide toward the door, fade out, advance the level index.
    LevelComplete,
    /// Player died: wait out the death animation window, reload the same level.
    RestartLevel,
}

#[derive(Resource, Default)]
pub struct TransitionState {
    pending: Option<TransitionKind>,
    timer: f32,
    duration: f32,
    fade_in: f32,
}

impl TransitionState {
    /// Records a pending transition. A transition already in flight wins; later requests in
    /// the same window are dropped.
    pub fn begin(&mut self, kind: TransitionKind) {
        if self.pending.is_some() {
            return;
        }

        self.pending = Some(kind);
        self.timer = 0.0;
        self.duration = match kind {
            TransitionKind::LevelComplete => DOOR_ENTRY_SECS + FADE_SECS,
            TransitionKind::RestartLevel => DEATH_SECS,
        };
    }

    pub fn pending(&self) -> Option<TransitionKind> {
        self.pending
    }

    pub fn in_progress(&self) -> bool {
        self.pending.is_some()
    }

    /// 0..1 progress of the door-entry slide, for the presentation layer.
    pub fn entry_progress(&self) -> f32 {
        match self.pending {
            Some(TransitionKind::LevelComplete) => (self.timer / DOOR_ENTRY_SECS).min(1.0),
            _ => 0.0,
        }
    }

    /// Overlay opacity: ramps to black at the tail of an outgoing level-complete transition,
    /// and back to transparent right after a level spawn.
    pub fn fade_alpha(&self) -> f32 {
        if let Some(TransitionKind::LevelComplete) = self.pending {
            if self.timer > DOOR_ENTRY_SECS {
                return ((self.timer - DOOR_ENTRY_SECS) / FADE_SECS).clamp(0.0, 1.0);
            }
            return 0.0;
        }

        (self.fade_in / FADE_SECS).clamp(0.0, 1.0)
    }

    fn reset(&mut self) {
        self.pending = None;
        self.timer = 0.0;
        self.duration = 0.0;
    }
}

pub struct TransitionPlugin;

impl Plugin for TransitionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TransitionState>()
            .add_systems(OnEnter(GameState::Playing), begin_fade_in)
            .add_systems(
                Update,
                update_transition
                    .in_set(GameSet::Session)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

fn begin_fade_in(mut transition: ResMut<TransitionState>) {
    transition.fade_in = FADE_SECS;
}

fn update_transition(
    time: Res<Time>,
    mut commands: Commands,
    mut transition: ResMut<TransitionState>,
    mut session: ResMut<SessionState>,
    mut next_state: ResMut<NextState<GameState>>,
    mut completed: EventWriter<LevelCompleted>,
    mut died: EventWriter<PlayerDied>,
    mut removed: EventWriter<EntityRemoved>,
    players: Query<Entity, With<Mallard>>,
) {
    let dt = time.delta_seconds();

    if transition.fade_in > 0.0 {
        transition.fade_in = (transition.fade_in - dt).max(0.0);
    }

    let Some(kind) = transition.pending else {
        return;
    };

    transition.timer += dt;
    if transition.timer < transition.duration {
        return;
    }

    match kind {
        TransitionKind::LevelComplete => {
            completed.send(LevelCompleted {
                index: session.level,
            });
            // The loader wraps modulo the catalog length, so plain increment is enough.
            session.level += 1;
        }
        TransitionKind::RestartLevel => {
            for entity in &players {
                commands.entity(entity).despawn_recursive();
                removed.send(EntityRemoved(entity));
            }
            died.send(PlayerDied);
        }
    }

    transition.reset();
    next_state.set(GameState::Loading);
}
