use bevy::prelude::*;

use crate::state::{GameSet, GameState};

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Gravity>()
            .init_resource::<WorldBounds>()
            .add_systems(
                Update,
                integrate
                    .in_set(GameSet::Physics)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Downward acceleration applied to every gravity-enabled body, in units/s².
#[derive(Resource)]
pub struct Gravity(pub f32);

impl Default for Gravity {
    fn default() -> Self {
        Self(1200.0)
    }
}

/// Playable area. The world is y-up with the origin at the bottom-left corner.
#[derive(Resource, Clone, Copy)]
pub struct WorldBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(960.0, 600.0),
        }
    }
}

impl WorldBounds {
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

/// Per-frame contact flags. Reset at the start of integration, repopulated by the
/// world-bounds clamp and by solid resolution.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Touching {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Component)]
pub struct PhysicsBody {
    pub velocity: Vec2,
    pub half_extents: Vec2,
    pub allow_gravity: bool,
    pub collide_world_bounds: bool,
    pub immovable: bool,
    pub enabled: bool,
    pub touching: Touching,
}

impl PhysicsBody {
    pub fn new(size: Vec2) -> Self {
        Self {
            velocity: Vec2::ZERO,
            half_extents: size * 0.5,
            allow_gravity: true,
            collide_world_bounds: false,
            immovable: false,
            enabled: true,
            touching: Touching::default(),
        }
    }

    /// Static geometry and trigger bodies: never integrated, never displaced.
    pub fn fixed(size: Vec2) -> Self {
        Self {
            allow_gravity: false,
            immovable: true,
            ..Self::new(size)
        }
    }

    pub fn with_world_bounds(mut self) -> Self {
        self.collide_world_bounds = true;
        self
    }

    pub fn grounded(&self) -> bool {
        self.touching.down
    }
}

pub fn integrate(
    time: Res<Time>,
    gravity: Res<Gravity>,
    bounds: Res<WorldBounds>,
    mut query: Query<(&mut Transform, &mut PhysicsBody)>,
) {
    let dt = time.delta_seconds();

    for (mut transform, mut body) in &mut query {
        if !body.enabled || body.immovable {
            continue;
        }

        body.touching = Touching::default();

        if body.allow_gravity {
            body.velocity.y -= gravity.0 * dt;
        }

        transform.translation.x += body.velocity.x * dt;
        transform.translation.y += body.velocity.y * dt;

        if body.collide_world_bounds {
            clamp_to_bounds(&mut transform.translation, &mut body, &bounds);
        }
    }
}

fn clamp_to_bounds(position: &mut Vec3, body: &mut PhysicsBody, bounds: &WorldBounds) {
    let half = body.half_extents;

    if position.x - half.x < bounds.min.x {
        position.x = bounds.min.x + half.x;
        body.velocity.x = body.velocity.x.max(0.0);
        body.touching.left = true;
    } else if position.x + half.x > bounds.max.x {
        position.x = bounds.max.x - half.x;
        body.velocity.x = body.velocity.x.min(0.0);
        body.touching.right = true;
    }

    if position.y - half.y < bounds.min.y {
        position.y = bounds.min.y + half.y;
        body.velocity.y = body.velocity.y.max(0.0);
        body.touching.down = true;
    } else if position.y + half.y > bounds.max.y {
        position.y = bounds.max.y - half.y;
        body.velocity.y = body.velocity.y.min(0.0);
        body.touching.up = true;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::ecs::system::RunSystemOnce;

    use super::*;

    fn world_with_dt(dt: f32) -> World {
        let mut world = World::new();
        let mut time = Time::default();
        time.advance_by(Duration::from_secs_f32(dt));
        world.insert_resource(time);
        world.insert_resource(Gravity::default());
        world.insert_resource(WorldBounds::default());
        world
    }

    #[test]
    fn gravity_accelerates_falling_bodies() {
        let mut world = world_with_dt(0.5);
        let id = world
            .spawn((
                Transform::from_xyz(100.0, 300.0, 0.0),
                PhysicsBody::new(Vec2::new(42.0, 60.0)),
            ))
            .id();

        world.run_system_once(integrate);

        let body = world.get::<PhysicsBody>(id).unwrap();
        let transform = world.get::<Transform>(id).unwrap();
        assert_eq!(body.velocity.y, -600.0);
        assert_eq!(transform.translation.y, 0.0);
    }

    #[test]
    fn world_bounds_clamp_zeroes_velocity_and_reports_contact() {
        let mut world = world_with_dt(0.1);
        let id = world
            .spawn((
                Transform::from_xyz(100.0, 31.0, 0.0),
                {
                    let mut body = PhysicsBody::new(Vec2::new(42.0, 60.0)).with_world_bounds();
                    body.velocity.y = -400.0;
                    body
                },
            ))
            .id();

        world.run_system_once(integrate);

        let body = world.get::<PhysicsBody>(id).unwrap();
        let transform = world.get::<Transform>(id).unwrap();
        assert_eq!(transform.translation.y, 30.0);
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.touching.down);
    }

    #[test]
    fn disabled_bodies_do_not_integrate() {
        let mut world = world_with_dt(0.1);
        let id = world
            .spawn((Transform::from_xyz(50.0, 50.0, 0.0), {
                let mut body = PhysicsBody::new(Vec2::splat(10.0));
                body.velocity = Vec2::new(100.0, 100.0);
                body.enabled = false;
                body
            }))
            .id();

        world.run_system_once(integrate);

        let transform = world.get::<Transform>(id).unwrap();
        assert_eq!(transform.translation.truncate(), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn gravity_can_be_disabled_per_body() {
        let mut world = world_with_dt(0.25);
        let id = world
            .spawn((Transform::default(), {
                let mut body = PhysicsBody::new(Vec2::splat(20.0));
                body.allow_gravity = false;
                body.velocity.x = 100.0;
                body
            }))
            .id();

        world.run_system_once(integrate);

        let body = world.get::<PhysicsBody>(id).unwrap();
        let transform = world.get::<Transform>(id).unwrap();
        assert_eq!(body.velocity.y, 0.0);
        assert_eq!(transform.translation.x, 25.0);
    }
}
