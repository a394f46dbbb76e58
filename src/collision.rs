use bevy::prelude::*;

use crate::enemy::{EnemyWall, Pigeon};
use crate::level::Platform;
use crate::physics::PhysicsBody;
use crate::player::Mallard;
use crate::state::{GameSet, GameState};

pub struct CollisionPlugin;

impl Plugin for CollisionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (collide_with_platforms, collide_pigeons_with_walls)
                .chain()
                .in_set(SolidCollisionSystems)
                .in_set(GameSet::Collisions)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Overlap triggers order themselves after this set so their predicates observe
/// post-resolution touching flags.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SolidCollisionSystems;

pub fn aabb_overlap(a_pos: Vec2, a_half: Vec2, b_pos: Vec2, b_half: Vec2) -> bool {
    (a_pos.x - b_pos.x).abs() < a_half.x + b_half.x
        && (a_pos.y - b_pos.y).abs() < a_half.y + b_half.y
}

/// Pushes a dynamic body out of a static rectangle along the axis of least
/// interpenetration, zeroing the velocity component aimed at the obstacle and
/// recording which side made contact. Returns whether the pair intersected.
pub fn separate(position: &mut Vec3, body: &mut PhysicsBody, s_pos: Vec2, s_half: Vec2) -> bool {
    let delta = position.truncate() - s_pos;
    let overlap_x = body.half_extents.x + s_half.x - delta.x.abs();
    if overlap_x <= 0.0 {
        return false;
    }
    let overlap_y = body.half_extents.y + s_half.y - delta.y.abs();
    if overlap_y <= 0.0 {
        return false;
    }

    if overlap_x < overlap_y {
        if delta.x >= 0.0 {
            position.x += overlap_x;
            body.velocity.x = body.velocity.x.max(0.0);
            body.touching.left = true;
        } else {
            position.x -= overlap_x;
            body.velocity.x = body.velocity.x.min(0.0);
            body.touching.right = true;
        }
    } else if delta.y >= 0.0 {
        position.y += overlap_y;
        body.velocity.y = body.velocity.y.max(0.0);
        body.touching.down = true;
    } else {
        position.y -= overlap_y;
        body.velocity.y = body.velocity.y.min(0.0);
        body.touching.up = true;
    }

    true
}

fn collide_with_platforms(
    mut dynamics: Query<(&mut Transform, &mut PhysicsBody), Or<(With<Mallard>, With<Pigeon>)>>,
    platforms: Query<
        (&Transform, &PhysicsBody),
        (With<Platform>, Without<Mallard>, Without<Pigeon>),
    >,
) {
    for (mut transform, mut body) in &mut dynamics {
        if !body.enabled {
            continue;
        }

        for (platform_transform, platform_body) in &platforms {
            separate(
                &mut transform.translation,
                &mut body,
                platform_transform.translation.truncate(),
                platform_body.half_extents,
            );
        }
    }
}

fn collide_pigeons_with_walls(
    mut pigeons: Query<(&mut Transform, &mut PhysicsBody), With<Pigeon>>,
    walls: Query<(&Transform, &PhysicsBody), (With<EnemyWall>, Without<Pigeon>)>,
) {
    for (mut transform, mut body) in &mut pigeons {
        if !body.enabled {
            continue;
        }

        for (wall_transform, wall_body) in &walls {
            separate(
                &mut transform.translation,
                &mut body,
                wall_transform.translation.truncate(),
                wall_body.half_extents,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_requires_intersection_on_both_axes() {
        let half = Vec2::splat(10.0);
        assert!(aabb_overlap(
            Vec2::new(0.0, 0.0),
            half,
            Vec2::new(15.0, 5.0),
            half
        ));
        assert!(!aabb_overlap(
            Vec2::new(0.0, 0.0),
            half,
            Vec2::new(25.0, 0.0),
            half
        ));
        assert!(!aabb_overlap(
            Vec2::new(0.0, 0.0),
            half,
            Vec2::new(15.0, 25.0),
            half
        ));
    }

    #[test]
    fn landing_pushes_up_and_grounds_the_body() {
        let mut body = PhysicsBody::new(Vec2::new(42.0, 60.0));
        body.velocity = Vec2::new(50.0, -300.0);
        // Body center slightly sunk into a platform whose top face is at y = 100.
        let mut position = Vec3::new(100.0, 125.0, 0.0);

        let resolved = separate(
            &mut position,
            &mut body,
            Vec2::new(100.0, 64.0),
            Vec2::new(480.0, 36.0),
        );

        assert!(resolved);
        assert_eq!(position.y, 130.0);
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.touching.down);
        assert_eq!(body.velocity.x, 50.0);
    }

    #[test]
    fn side_contact_pushes_out_horizontally() {
        let mut body = PhysicsBody::new(Vec2::new(58.0, 48.0));
        body.velocity.x = 100.0;
        // Walking right into a thin wall centered at x = 200.
        let mut position = Vec3::new(173.0, 50.0, 0.0);

        let resolved = separate(
            &mut position,
            &mut body,
            Vec2::new(200.0, 50.0),
            Vec2::new(5.0, 30.0),
        );

        assert!(resolved);
        assert_eq!(position.x, 166.0);
        assert_eq!(body.velocity.x, 0.0);
        assert!(body.touching.right);
    }

    #[test]
    fn separated_rectangles_are_untouched() {
        let mut body = PhysicsBody::new(Vec2::splat(20.0));
        let mut position = Vec3::new(0.0, 0.0, 0.0);

        let resolved = separate(
            &mut position,
            &mut body,
            Vec2::new(100.0, 0.0),
            Vec2::splat(10.0),
        );

        assert!(!resolved);
        assert_eq!(position, Vec3::ZERO);
        assert_eq!(body.touching, crate::physics::Touching::default());
    }
}
