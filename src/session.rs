//! Play-session bookkeeping: the HUD-facing session values, the overlap-trigger handlers, and
//! the lifecycle events surfaced to the host.
//!
//! The handlers run after solid resolution so their predicates observe this frame's touching
//! flags, in the fixed order coins → pigeons → key → door.

use bevy::prelude::*;

use crate::audio::{Cue, PlayCue};
use crate::collision::{aabb_overlap, SolidCollisionSystems};
use crate::enemy::Pigeon;
use crate::level::{Coin, Door, LevelKey};
use crate::physics::PhysicsBody;
use crate::player::Mallard;
use crate::state::{GameSet, GameState};
use crate::transition::{TransitionKind, TransitionState};

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SessionState>()
            .add_event::<LevelLoadRequested>()
            .add_event::<LevelLoadFailed>()
            .add_event::<LevelCompleted>()
            .add_event::<PlayerDied>()
            .add_event::<EntityRemoved>()
            .add_systems(
                Update,
                (collect_coins, clash_with_pigeons, collect_key, enter_door)
                    .chain()
                    .after(SolidCollisionSystems)
                    .in_set(GameSet::Collisions)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Session values the host reads for the HUD. The coin counter is monotonic for the whole
/// session and survives every level transition; the key resets on each level load; the level
/// index is normalized by the loader.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct SessionState {
    pub coins: u32,
    pub has_key: bool,
    pub level: usize,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct LevelLoadRequested {
    pub index: usize,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct LevelLoadFailed {
    pub index: usize,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct LevelCompleted {
    pub index: usize,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct PlayerDied;

#[derive(Event, Debug, Clone, Copy)]
pub struct EntityRemoved(pub Entity);

/// The door only admits a keyed, grounded player. Pure over the explicit inputs; no
/// captured context.
pub fn door_entry_allowed(has_key: bool, grounded: bool) -> bool {
    has_key && grounded
}

fn overlaps(
    a: (&Transform, &PhysicsBody),
    b: (&Transform, &PhysicsBody),
) -> bool {
    aabb_overlap(
        a.0.translation.truncate(),
        a.1.half_extents,
        b.0.translation.truncate(),
        b.1.half_extents,
    )
}

fn collect_coins(
    mut commands: Commands,
    mut session: ResMut<SessionState>,
    mut cues: EventWriter<PlayCue>,
    mut removed: EventWriter<EntityRemoved>,
    player: Query<(&Transform, &PhysicsBody), With<Mallard>>,
    coins: Query<(Entity, &Transform, &PhysicsBody), With<Coin>>,
) {
    let Ok(player) = player.get_single() else {
        return;
    };
    if !player.1.enabled {
        return;
    }

    for (entity, transform, body) in &coins {
        if overlaps(player, (transform, body)) {
            commands.entity(entity).despawn_recursive();
            removed.send(EntityRemoved(entity));
            session.coins += 1;
            cues.send(PlayCue(Cue::Coin));
        }
    }
}

fn clash_with_pigeons(
    mut commands: Commands,
    mut cues: EventWriter<PlayCue>,
    mut removed: EventWriter<EntityRemoved>,
    mut transition: ResMut<TransitionState>,
    mut player: Query<(&Transform, &mut Mallard, &mut PhysicsBody), Without<Pigeon>>,
    mut pigeons: Query<(Entity, &Transform, &mut Pigeon, &mut PhysicsBody)>,
) {
    let Ok((player_transform, mut mallard, mut player_body)) = player.get_single_mut() else {
        return;
    };
    if !player_body.enabled || !mallard.alive {
        return;
    }

    for (entity, transform, mut pigeon, mut body) in &mut pigeons {
        // A pigeon killed earlier this frame never re-enters collision handling.
        if !pigeon.alive {
            continue;
        }
        if !overlaps((player_transform, &*player_body), (transform, &*body)) {
            continue;
        }

        if player_body.velocity.y < 0.0 {
            // Descending: stomp kill.
            pigeon.die(&mut body);
            commands.entity(entity).despawn_recursive();
            removed.send(EntityRemoved(entity));
            mallard.bounce(&mut player_body);
            cues.send(PlayCue(Cue::Stomp));
        } else {
            mallard.die(&mut player_body);
            cues.send(PlayCue(Cue::Stomp));
            transition.begin(TransitionKind::RestartLevel);
            break;
        }
    }
}

fn collect_key(
    mut commands: Commands,
    mut session: ResMut<SessionState>,
    mut cues: EventWriter<PlayCue>,
    mut removed: EventWriter<EntityRemoved>,
    player: Query<(&Transform, &PhysicsBody), With<Mallard>>,
    keys: Query<(Entity, &Transform, &PhysicsBody), With<LevelKey>>,
) {
    let Ok(player) = player.get_single() else {
        return;
    };
    if !player.1.enabled {
        return;
    }

    for (entity, transform, body) in &keys {
        if overlaps(player, (transform, body)) {
            commands.entity(entity).despawn_recursive();
            removed.send(EntityRemoved(entity));
            session.has_key = true;
            cues.send(PlayCue(Cue::Key));
        }
    }
}

fn enter_door(
    session: Res<SessionState>,
    mut transition: ResMut<TransitionState>,
    mut cues: EventWriter<PlayCue>,
    mut player: Query<(&Transform, &mut Mallard, &mut PhysicsBody), Without<Door>>,
    mut doors: Query<(&Transform, &mut Door, &PhysicsBody)>,
) {
    let Ok((player_transform, mut mallard, mut player_body)) = player.get_single_mut() else {
        return;
    };
    if !player_body.enabled || !mallard.alive {
        return;
    }

    let Ok((door_transform, mut door, door_body)) = doors.get_single_mut() else {
        return;
    };
    if door.open {
        return;
    }
    if !overlaps((player_transform, &*player_body), (door_transform, door_body)) {
        return;
    }
    if !door_entry_allowed(session.has_key, player_body.grounded()) {
        return;
    }

    door.open = true;
    cues.send(PlayCue(Cue::Door));
    mallard.freeze(&mut player_body);
    transition.begin(TransitionKind::LevelComplete);
}
