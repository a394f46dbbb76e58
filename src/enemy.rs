use bevy::prelude::*;

use crate::physics::PhysicsBody;
use crate::state::{GameSet, GameState};

pub const PATROL_SPEED: f32 = 100.0;

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            patrol
                .in_set(GameSet::EntityState)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

#[derive(Component)]
pub struct Pigeon {
    pub facing: f32,
    pub alive: bool,
}

impl Default for Pigeon {
    fn default() -> Self {
        Self {
            facing: 1.0,
            alive: true,
        }
    }
}

impl Pigeon {
    /// Kills the pigeon in place: the flag flips synchronously so no other system touches this
    /// entity again within the frame it died, while the actual despawn is deferred to the
    /// command queue by the caller.
    pub fn die(&mut self, body: &mut PhysicsBody) {
        self.alive = false;
        body.enabled = false;
    }
}

/// Invisible patrol bound anchored to a platform edge. Solid for pigeons only.
#[derive(Component)]
pub struct EnemyWall;

fn patrol(mut query: Query<(&mut Pigeon, &mut PhysicsBody)>) {
    for (mut pigeon, mut body) in &mut query {
        if !pigeon.alive {
            continue;
        }

        if body.touching.right {
            body.velocity.x = -PATROL_SPEED;
        } else if body.touching.left {
            body.velocity.x = PATROL_SPEED;
        }

        if body.velocity.x < 0.0 {
            pigeon.facing = -1.0;
        } else if body.velocity.x > 0.0 {
            pigeon.facing = 1.0;
        }
    }
}
