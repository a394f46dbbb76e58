//! Host-side visuals. Gameplay entities are plain data; this module hangs colored-quad sprites
//! off them after they spawn and keeps those sprites in sync with the simulation (facing,
//! door state, transition effects). Nothing here writes gameplay state.

use bevy::color::Alpha;
use bevy::prelude::*;

use crate::enemy::Pigeon;
use crate::level::{platform_size, Coin, Door, LevelKey, Platform};
use crate::level::{COIN_SIZE, DOOR_SIZE, KEY_SIZE, MALLARD_SIZE, PIGEON_SIZE};
use crate::physics::WorldBounds;
use crate::player::Mallard;
use crate::transition::{TransitionKind, TransitionState};

const SKY_COLOR: Color = Color::srgb(0.55, 0.75, 0.95);
const GROUND_COLOR: Color = Color::srgb(0.45, 0.3, 0.2);
const GRASS_COLOR: Color = Color::srgb(0.3, 0.65, 0.3);
const MALLARD_COLOR: Color = Color::srgb(0.35, 0.55, 0.3);
const PIGEON_COLOR: Color = Color::srgb(0.55, 0.55, 0.62);
const COIN_COLOR: Color = Color::srgb(1.0, 0.85, 0.1);
const KEY_COLOR: Color = Color::srgb(0.95, 0.75, 0.15);
const DOOR_LOCKED_COLOR: Color = Color::srgb(0.5, 0.35, 0.2);
const DOOR_OPEN_COLOR: Color = Color::srgb(0.12, 0.08, 0.05);

pub struct VisualsPlugin;

impl Plugin for VisualsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (spawn_backdrop, spawn_fade_overlay))
            .add_systems(
                Update,
                (
                    attach_entity_sprites,
                    attach_key_visuals,
                    mirror_facing,
                    paint_door,
                    bob_key,
                    slide_into_door,
                    update_fade_overlay,
                ),
            );
    }
}

/// Full-screen black quad above everything else; opacity follows the transition state.
#[derive(Component)]
pub struct FadeOverlay;

/// Child sprite of the key entity. Only the visual bobs; the parent hitbox stays put.
#[derive(Component)]
struct KeyVisual;

fn colored_quad(color: Color, size: Vec2) -> (Sprite, Handle<Image>) {
    (
        Sprite {
            color,
            custom_size: Some(size),
            ..default()
        },
        Handle::default(),
    )
}

fn spawn_backdrop(mut commands: Commands, bounds: Res<WorldBounds>) {
    commands.spawn((
        Name::new("Backdrop"),
        SpriteBundle {
            sprite: Sprite {
                color: SKY_COLOR,
                custom_size: Some(bounds.size()),
                ..default()
            },
            transform: Transform::from_translation(bounds.center().extend(-10.0)),
            ..default()
        },
    ));
}

fn spawn_fade_overlay(mut commands: Commands, bounds: Res<WorldBounds>) {
    commands.spawn((
        FadeOverlay,
        Name::new("FadeOverlay"),
        SpriteBundle {
            sprite: Sprite {
                color: Color::srgba(0.0, 0.0, 0.0, 1.0),
                custom_size: Some(bounds.size() * 2.0),
                ..default()
            },
            transform: Transform::from_translation(bounds.center().extend(100.0)),
            ..default()
        },
    ));
}

fn attach_entity_sprites(
    mut commands: Commands,
    platforms: Query<(Entity, &Platform), Added<Platform>>,
    mallards: Query<Entity, Added<Mallard>>,
    pigeons: Query<Entity, Added<Pigeon>>,
    coins: Query<Entity, Added<Coin>>,
    doors: Query<Entity, Added<Door>>,
) {
    for (entity, platform) in &platforms {
        let color = if platform.image == "ground" {
            GROUND_COLOR
        } else {
            GRASS_COLOR
        };
        commands
            .entity(entity)
            .insert(colored_quad(color, platform_size(&platform.image)));
    }

    for entity in &mallards {
        commands
            .entity(entity)
            .insert(colored_quad(MALLARD_COLOR, MALLARD_SIZE));
    }
    for entity in &pigeons {
        commands
            .entity(entity)
            .insert(colored_quad(PIGEON_COLOR, PIGEON_SIZE));
    }
    for entity in &coins {
        commands
            .entity(entity)
            .insert(colored_quad(COIN_COLOR, COIN_SIZE));
    }
    for entity in &doors {
        commands
            .entity(entity)
            .insert(colored_quad(DOOR_LOCKED_COLOR, DOOR_SIZE));
    }
}

fn attach_key_visuals(mut commands: Commands, keys: Query<Entity, Added<LevelKey>>) {
    for entity in &keys {
        commands.entity(entity).with_children(|parent| {
            parent.spawn((
                KeyVisual,
                SpriteBundle {
                    sprite: Sprite {
                        color: KEY_COLOR,
                        custom_size: Some(KEY_SIZE),
                        ..default()
                    },
                    ..default()
                },
            ));
        });
    }
}

fn mirror_facing(
    mut mallards: Query<(&Mallard, &mut Sprite), Without<Pigeon>>,
    mut pigeons: Query<(&Pigeon, &mut Sprite), Without<Mallard>>,
) {
    for (mallard, mut sprite) in &mut mallards {
        sprite.flip_x = mallard.facing < 0.0;
    }
    for (pigeon, mut sprite) in &mut pigeons {
        sprite.flip_x = pigeon.facing < 0.0;
    }
}

fn paint_door(mut doors: Query<(&Door, &mut Sprite), Changed<Door>>) {
    for (door, mut sprite) in &mut doors {
        sprite.color = if door.open {
            DOOR_OPEN_COLOR
        } else {
            DOOR_LOCKED_COLOR
        };
    }
}

fn bob_key(time: Res<Time>, mut visuals: Query<&mut Transform, With<KeyVisual>>) {
    let offset = (time.elapsed_seconds() * 2.5).sin() * 3.0;
    for mut transform in &mut visuals {
        transform.translation.y = offset;
    }
}

/// During the level-complete window the frozen avatar glides toward the door and fades out,
/// driven purely by the transition's entry progress.
fn slide_into_door(
    transition: Res<TransitionState>,
    doors: Query<&Transform, (With<Door>, Without<Mallard>)>,
    mut players: Query<(&mut Transform, &mut Sprite), With<Mallard>>,
) {
    if transition.pending() != Some(TransitionKind::LevelComplete) {
        return;
    }
    let Ok(door) = doors.get_single() else {
        return;
    };
    let Ok((mut transform, mut sprite)) = players.get_single_mut() else {
        return;
    };

    let t = transition.entry_progress();
    let dx = door.translation.x - transform.translation.x;
    transform.translation.x += dx * t;
    sprite.color = MALLARD_COLOR.with_alpha(1.0 - t);
}

fn update_fade_overlay(
    transition: Res<TransitionState>,
    mut overlays: Query<&mut Sprite, With<FadeOverlay>>,
) {
    for mut sprite in &mut overlays {
        sprite.color = Color::srgba(0.0, 0.0, 0.0, transition.fade_alpha());
    }
}
