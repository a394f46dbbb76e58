//! Level orchestration: deserializes level documents, spawns the entity set for the selected
//! level, and tears the previous one down.
//!
//! Each level lives under a single `LevelRoot` entity, so a swap is one recursive despawn
//! followed by a fresh spawn. Level documents use the original screen coordinates (960×600,
//! y growing downward, platform positions at their top-left corner); the loader converts them
//! into the y-up world the simulation runs in.

use std::error::Error;
use std::fmt;

use bevy::prelude::*;
use serde::Deserialize;

use crate::enemy::{EnemyWall, Pigeon, PATROL_SPEED};
use crate::physics::{PhysicsBody, WorldBounds};
use crate::player::Mallard;
use crate::session::{LevelLoadFailed, LevelLoadRequested, SessionState};
use crate::state::GameState;

pub const MALLARD_SIZE: Vec2 = Vec2::new(42.0, 60.0);
pub const PIGEON_SIZE: Vec2 = Vec2::new(58.0, 48.0);
pub const COIN_SIZE: Vec2 = Vec2::new(22.0, 22.0);
pub const KEY_SIZE: Vec2 = Vec2::new(30.0, 30.0);
pub const DOOR_SIZE: Vec2 = Vec2::new(42.0, 66.0);
const WALL_SIZE: Vec2 = Vec2::new(10.0, 60.0);

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LevelCatalog>()
            .add_systems(OnEnter(GameState::Loading), spawn_level);
    }
}

/// Static, immovable rectangle the characters stand on. The image tag doubles as the size key
/// and the visual variant.
#[derive(Component)]
pub struct Platform {
    pub image: String,
}

#[derive(Component)]
pub struct Coin;

#[derive(Component)]
pub struct LevelKey;

#[derive(Component)]
pub struct Door {
    pub open: bool,
}

/// Marker on the level's root entity so the loader can despawn the whole graph before
/// spawning the next level.
#[derive(Component)]
pub struct LevelRoot;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformSpec {
    pub x: f32,
    pub y: f32,
    pub image: String,
}

/// One level document. The character/object lists may be empty or absent; the player spawn,
/// door, and key are required.
#[derive(Debug, Clone, Deserialize)]
pub struct LevelData {
    #[serde(default)]
    pub platforms: Vec<PlatformSpec>,
    #[serde(default)]
    pub pigeons: Vec<Point>,
    pub mallard: Point,
    #[serde(default)]
    pub coins: Vec<Point>,
    pub door: Point,
    pub key: Point,
}

#[derive(Debug)]
pub enum LevelLoadError {
    /// The catalog holds no documents at all.
    EmptyCatalog,
    /// The document for this index failed to deserialize (malformed JSON or a missing
    /// required field).
    Parse {
        index: usize,
        source: serde_json::Error,
    },
}

impl fmt::Display for LevelLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCatalog => write!(f, "level catalog holds no documents"),
            Self::Parse { index, source } => {
                write!(f, "level {index} failed to load: {source}")
            }
        }
    }
}

impl Error for LevelLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyCatalog => None,
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// One JSON document per level index. The binary bundles two levels; hosts and tests may
/// install their own catalog before startup.
#[derive(Resource)]
pub struct LevelCatalog {
    documents: Vec<String>,
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::new(vec![
            include_str!("../assets/levels/level00.json").to_owned(),
            include_str!("../assets/levels/level01.json").to_owned(),
        ])
    }
}

impl LevelCatalog {
    pub fn new(documents: Vec<String>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Level indices are always normalized modulo the catalog length, so an out-of-range
    /// index is impossible by construction.
    pub fn wrap(&self, index: usize) -> usize {
        index % self.documents.len().max(1)
    }

    pub fn load(&self, index: usize) -> Result<LevelData, LevelLoadError> {
        if self.documents.is_empty() {
            return Err(LevelLoadError::EmptyCatalog);
        }
        let index = self.wrap(index);
        parse_level(&self.documents[index]).map_err(|source| LevelLoadError::Parse { index, source })
    }
}

pub fn parse_level(document: &str) -> Result<LevelData, serde_json::Error> {
    serde_json::from_str(document)
}

/// Size, in world units, of a platform's rectangle, keyed by its visual tag.
pub fn platform_size(image: &str) -> Vec2 {
    match image {
        "ground" => Vec2::new(960.0, 72.0),
        "grass:8x1" => Vec2::new(336.0, 42.0),
        "grass:6x1" => Vec2::new(252.0, 42.0),
        "grass:4x1" => Vec2::new(168.0, 42.0),
        "grass:2x1" => Vec2::new(84.0, 42.0),
        _ => Vec2::new(42.0, 42.0),
    }
}

fn world_height(bounds: &WorldBounds) -> f32 {
    bounds.size().y
}

/// Top-left document position of a `w`×`h` rectangle → world-space center.
pub fn top_left_to_center(bounds: &WorldBounds, point: Point, size: Vec2) -> Vec2 {
    Vec2::new(
        point.x + size.x * 0.5,
        world_height(bounds) - point.y - size.y * 0.5,
    )
}

/// Center-anchored document position → world-space center.
pub fn center_to_center(bounds: &WorldBounds, point: Point) -> Vec2 {
    Vec2::new(point.x, world_height(bounds) - point.y)
}

/// Bottom-center document position (the door's anchor) → world-space center.
pub fn bottom_center_to_center(bounds: &WorldBounds, point: Point, size: Vec2) -> Vec2 {
    Vec2::new(point.x, world_height(bounds) - point.y + size.y * 0.5)
}

fn spawn_level(
    mut commands: Commands,
    roots: Query<Entity, With<LevelRoot>>,
    catalog: Res<LevelCatalog>,
    bounds: Res<WorldBounds>,
    mut session: ResMut<SessionState>,
    mut next_state: ResMut<NextState<GameState>>,
    mut requested: EventWriter<LevelLoadRequested>,
    mut failed: EventWriter<LevelLoadFailed>,
) {
    for entity in &roots {
        commands.entity(entity).despawn_recursive();
    }

    if catalog.is_empty() {
        warn!("{}", LevelLoadError::EmptyCatalog);
        return;
    }

    let mut index = catalog.wrap(session.level);
    requested.send(LevelLoadRequested { index });

    let data = match catalog.load(index) {
        Ok(data) => data,
        Err(err) => {
            warn!("{err}");
            failed.send(LevelLoadFailed { index });
            // Fall back to the first level; the host hears about both failures.
            if index == 0 {
                return;
            }
            index = 0;
            match catalog.load(index) {
                Ok(data) => data,
                Err(err) => {
                    warn!("{err}");
                    failed.send(LevelLoadFailed { index });
                    return;
                }
            }
        }
    };

    session.level = index;
    session.has_key = false;

    info!("Spawning level {index}");
    spawn_entities(&mut commands, &data, &bounds);
    next_state.set(GameState::Playing);
}

fn spawn_entities(commands: &mut Commands, data: &LevelData, bounds: &WorldBounds) {
    commands
        .spawn((LevelRoot, Name::new("LevelRoot"), SpatialBundle::default()))
        .with_children(|root| {
            for spec in &data.platforms {
                spawn_platform(root, bounds, spec);
            }

            for point in &data.pigeons {
                let center = center_to_center(bounds, *point);
                let mut body = PhysicsBody::new(PIGEON_SIZE).with_world_bounds();
                body.velocity.x = PATROL_SPEED;
                root.spawn((
                    Name::new("Pigeon"),
                    Pigeon::default(),
                    body,
                    SpatialBundle::from_transform(Transform::from_translation(center.extend(3.0))),
                ));
            }

            let spawn = center_to_center(bounds, data.mallard);
            root.spawn((
                Name::new("Mallard"),
                Mallard::default(),
                PhysicsBody::new(MALLARD_SIZE).with_world_bounds(),
                SpatialBundle::from_transform(Transform::from_translation(spawn.extend(4.0))),
            ));

            for point in &data.coins {
                let center = center_to_center(bounds, *point);
                root.spawn((
                    Name::new("Coin"),
                    Coin,
                    PhysicsBody::fixed(COIN_SIZE),
                    SpatialBundle::from_transform(Transform::from_translation(center.extend(2.0))),
                ));
            }

            let door = bottom_center_to_center(bounds, data.door, DOOR_SIZE);
            root.spawn((
                Name::new("Door"),
                Door { open: false },
                PhysicsBody::fixed(DOOR_SIZE),
                SpatialBundle::from_transform(Transform::from_translation(door.extend(0.2))),
            ));

            let key = center_to_center(bounds, data.key);
            root.spawn((
                Name::new("Key"),
                LevelKey,
                PhysicsBody::fixed(KEY_SIZE),
                SpatialBundle::from_transform(Transform::from_translation(key.extend(0.3))),
            ));
        });
}

fn spawn_platform(root: &mut ChildBuilder, bounds: &WorldBounds, spec: &PlatformSpec) {
    let size = platform_size(&spec.image);
    let center = top_left_to_center(bounds, Point { x: spec.x, y: spec.y }, size);

    root.spawn((
        Name::new(format!("Platform:{}", spec.image)),
        Platform {
            image: spec.image.clone(),
        },
        PhysicsBody::fixed(size),
        SpatialBundle::from_transform(Transform::from_translation(center.extend(1.0))),
    ));

    // Invisible walls hug the platform's top corners so pigeons patrol its extent
    // without walking off.
    let top = center.y + size.y * 0.5;
    for side in [-1.0f32, 1.0] {
        let x = center.x + side * (size.x * 0.5 + WALL_SIZE.x * 0.5);
        root.spawn((
            Name::new("EnemyWall"),
            EnemyWall,
            PhysicsBody::fixed(WALL_SIZE),
            SpatialBundle::from_transform(Transform::from_translation(Vec3::new(
                x,
                top + WALL_SIZE.y * 0.5,
                0.0,
            ))),
        ));
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;

    use super::*;

    const MINIMAL: &str = r#"{
        "platforms": [{"x": 0, "y": 528, "image": "ground"}],
        "mallard": {"x": 100, "y": 480},
        "door": {"x": 700, "y": 528},
        "key": {"x": 400, "y": 300}
    }"#;

    #[test]
    fn parses_a_full_document() {
        let data = parse_level(
            r#"{
                "platforms": [{"x": 0, "y": 528, "image": "ground"}],
                "pigeons": [{"x": 300, "y": 480}],
                "mallard": {"x": 100, "y": 480},
                "coins": [{"x": 200, "y": 400}, {"x": 240, "y": 400}],
                "door": {"x": 700, "y": 528},
                "key": {"x": 400, "y": 300}
            }"#,
        )
        .unwrap();

        assert_eq!(data.platforms.len(), 1);
        assert_eq!(data.pigeons.len(), 1);
        assert_eq!(data.coins.len(), 2);
        assert_eq!(data.mallard, Point { x: 100.0, y: 480.0 });
    }

    #[test]
    fn optional_lists_default_to_empty() {
        let data = parse_level(MINIMAL).unwrap();
        assert!(data.pigeons.is_empty());
        assert!(data.coins.is_empty());
    }

    #[test]
    fn missing_required_fields_are_load_errors() {
        let err = parse_level(r#"{"mallard": {"x": 0, "y": 0}, "door": {"x": 0, "y": 0}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("key"));

        let catalog = LevelCatalog::new(vec!["{}".to_owned()]);
        let err = catalog.load(0).unwrap_err();
        assert!(err.to_string().contains("level 0"));
    }

    #[test]
    fn indices_wrap_modulo_catalog_length() {
        let catalog = LevelCatalog::new(vec![MINIMAL.to_owned(), MINIMAL.to_owned()]);
        assert_eq!(catalog.wrap(0), 0);
        assert_eq!(catalog.wrap(1), 1);
        assert_eq!(catalog.wrap(2), 0);
        assert_eq!(catalog.wrap(5), 1);
    }

    #[test]
    fn bundled_levels_parse() {
        let catalog = LevelCatalog::default();
        assert_eq!(catalog.len(), 2);
        for index in 0..catalog.len() {
            catalog.load(index).unwrap();
        }
    }

    #[test]
    fn document_coordinates_convert_to_y_up() {
        let bounds = WorldBounds::default();

        // Ground platform at the bottom of the 600-high screen.
        let center = top_left_to_center(
            &bounds,
            Point { x: 0.0, y: 528.0 },
            platform_size("ground"),
        );
        assert_eq!(center, Vec2::new(480.0, 36.0));

        let center = center_to_center(&bounds, Point { x: 100.0, y: 480.0 });
        assert_eq!(center, Vec2::new(100.0, 120.0));

        // A door standing on that ground has its feet at the platform top.
        let center = bottom_center_to_center(&bounds, Point { x: 700.0, y: 528.0 }, DOOR_SIZE);
        assert_eq!(center, Vec2::new(700.0, 105.0));
    }

    #[test]
    fn spawns_the_entity_set_with_synthesized_walls() {
        let mut world = World::new();
        world.insert_resource(LevelCatalog::new(vec![MINIMAL.to_owned()]));
        world.insert_resource(WorldBounds::default());
        world.insert_resource(SessionState::default());
        world.init_resource::<NextState<GameState>>();
        world.init_resource::<Events<LevelLoadRequested>>();
        world.init_resource::<Events<LevelLoadFailed>>();

        world.run_system_once(spawn_level);

        assert_eq!(world.query::<&Platform>().iter(&world).count(), 1);
        assert_eq!(world.query::<&EnemyWall>().iter(&world).count(), 2);
        assert_eq!(world.query::<&Mallard>().iter(&world).count(), 1);
        assert_eq!(world.query::<&Door>().iter(&world).count(), 1);
        assert_eq!(world.query::<&LevelKey>().iter(&world).count(), 1);
        assert_eq!(world.query::<&Coin>().iter(&world).count(), 0);
        assert_eq!(world.query::<&Pigeon>().iter(&world).count(), 0);
        assert!(!world.resource::<SessionState>().has_key);
    }

    #[test]
    fn malformed_level_falls_back_to_level_zero() {
        let mut world = World::new();
        world.insert_resource(LevelCatalog::new(vec![
            MINIMAL.to_owned(),
            "not json".to_owned(),
        ]));
        world.insert_resource(WorldBounds::default());
        world.insert_resource(SessionState {
            level: 1,
            ..SessionState::default()
        });
        world.init_resource::<NextState<GameState>>();
        world.init_resource::<Events<LevelLoadRequested>>();
        world.init_resource::<Events<LevelLoadFailed>>();

        world.run_system_once(spawn_level);

        assert_eq!(world.resource::<SessionState>().level, 0);
        assert_eq!(world.query::<&Mallard>().iter(&world).count(), 1);
        assert_eq!(world.resource::<Events<LevelLoadFailed>>().len(), 1);
    }
}
