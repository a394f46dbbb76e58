//! Player entity behavior: movement/jump operations, the logical action state machine, and the
//! bridge from host-polled input devices to the logical intents the simulation consumes.
//!
//! The avatar is a plain data component paired with a `PhysicsBody`; anything visual hangs off
//! the presentation layer instead of being inherited from a sprite type.

use bevy::prelude::*;

use crate::audio::{Cue, PlayCue};
use crate::physics::PhysicsBody;
use crate::state::{GameSet, GameState};

pub const RUN_SPEED: f32 = 200.0;
pub const JUMP_SPEED: f32 = 600.0;
pub const BOUNCE_SPEED: f32 = 200.0;

/// A held jump only re-triggers boost during the first 200 ms of the hold.
pub const JUMP_HOLD_WINDOW: f32 = 0.2;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputIntents>().add_systems(
            Update,
            (
                apply_player_input.in_set(GameSet::Input),
                sync_player_action.in_set(GameSet::EntityState),
            )
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Logical animation state, re-derived every frame. Does not gate input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    #[default]
    Stop,
    Run,
    Jump,
    Fall,
}

#[derive(Component)]
pub struct Mallard {
    pub facing: f32,
    pub alive: bool,
    pub frozen: bool,
    pub boosting: bool,
    pub action: PlayerAction,
}

impl Default for Mallard {
    fn default() -> Self {
        Self {
            facing: 1.0,
            alive: true,
            frozen: false,
            boosting: false,
            action: PlayerAction::Stop,
        }
    }
}

impl Mallard {
    /// Sets horizontal velocity from a direction in {-1, 0, 1}. Facing follows the sign of the
    /// resulting velocity and is left unchanged when stopping. No-op while frozen.
    pub fn move_dir(&mut self, body: &mut PhysicsBody, direction: f32) {
        if self.frozen {
            return;
        }

        body.velocity.x = direction * RUN_SPEED;

        if body.velocity.x < 0.0 {
            self.facing = -1.0;
        } else if body.velocity.x > 0.0 {
            self.facing = 1.0;
        }
    }

    /// Returns whether a jump was initiated this call. Upward velocity is applied both on
    /// initiation and while boosting, so one call per frame sustains a held jump.
    pub fn jump(&mut self, body: &mut PhysicsBody) -> bool {
        let can_jump = body.grounded() && self.alive && !self.frozen;

        if can_jump || self.boosting {
            body.velocity.y = JUMP_SPEED;
            self.boosting = true;
        }

        can_jump
    }

    /// Ends jump sustain. Must run every frame the jump input is not held.
    pub fn stop_jump_boost(&mut self) {
        self.boosting = false;
    }

    /// Disables physics so the door-entry tween can move the avatar without interference.
    pub fn freeze(&mut self, body: &mut PhysicsBody) {
        body.enabled = false;
        self.frozen = true;
    }

    /// Upward recoil after stomping an enemy.
    pub fn bounce(&mut self, body: &mut PhysicsBody) {
        body.velocity.y = BOUNCE_SPEED;
    }

    /// Marks the avatar dead and freezes its body; removal happens when the death window in
    /// `TransitionState` elapses.
    pub fn die(&mut self, body: &mut PhysicsBody) {
        self.alive = false;
        body.enabled = false;
    }

    /// Highest-priority match wins; evaluated every frame against post-resolution contact state.
    pub fn derive_action(&self, body: &PhysicsBody) -> PlayerAction {
        if !self.alive || self.frozen {
            PlayerAction::Stop
        } else if body.velocity.y > 0.0 {
            PlayerAction::Jump
        } else if !body.grounded() {
            PlayerAction::Fall
        } else if body.velocity.x != 0.0 {
            PlayerAction::Run
        } else {
            PlayerAction::Stop
        }
    }
}

/// Logical input intents consumed by the simulation. The presentation layer polls the keyboard
/// into this resource; tests write it directly.
#[derive(Resource, Default)]
pub struct InputIntents {
    pub move_dir: f32,
    pub jump_held: bool,
    /// Time the jump input has been held, tracked core-side to bound boost re-trigger.
    pub jump_hold_secs: f32,
}

/// Host-side keyboard polling. Registered with the presentation plugins only.
pub fn poll_keyboard(keyboard: Res<ButtonInput<KeyCode>>, mut intents: ResMut<InputIntents>) {
    let mut dir = 0.0;
    if keyboard.pressed(KeyCode::ArrowLeft) || keyboard.pressed(KeyCode::KeyA) {
        dir -= 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowRight) || keyboard.pressed(KeyCode::KeyD) {
        dir += 1.0;
    }

    intents.move_dir = dir;
    intents.jump_held = keyboard.pressed(KeyCode::Space) || keyboard.pressed(KeyCode::ArrowUp);
}

fn apply_player_input(
    time: Res<Time>,
    mut intents: ResMut<InputIntents>,
    mut cues: EventWriter<PlayCue>,
    mut query: Query<(&mut Mallard, &mut PhysicsBody)>,
) {
    let Ok((mut mallard, mut body)) = query.get_single_mut() else {
        return;
    };

    mallard.move_dir(&mut body, intents.move_dir);

    if intents.jump_held && intents.jump_hold_secs < JUMP_HOLD_WINDOW {
        if mallard.jump(&mut body) {
            cues.send(PlayCue(Cue::Jump));
        }
    } else {
        mallard.stop_jump_boost();
    }

    if intents.jump_held {
        intents.jump_hold_secs += time.delta_seconds();
    } else {
        intents.jump_hold_secs = 0.0;
    }
}

fn sync_player_action(mut query: Query<(&mut Mallard, &PhysicsBody)>) {
    for (mut mallard, body) in &mut query {
        let action = mallard.derive_action(body);
        if mallard.action != action {
            mallard.action = action;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grounded_body() -> PhysicsBody {
        let mut body = PhysicsBody::new(Vec2::new(42.0, 60.0));
        body.touching.down = true;
        body
    }

    #[test]
    fn move_sets_velocity_and_facing() {
        let mut mallard = Mallard::default();
        let mut body = grounded_body();

        mallard.move_dir(&mut body, -1.0);
        assert_eq!(body.velocity.x, -RUN_SPEED);
        assert_eq!(mallard.facing, -1.0);

        mallard.move_dir(&mut body, 1.0);
        assert_eq!(body.velocity.x, RUN_SPEED);
        assert_eq!(mallard.facing, 1.0);

        // Stopping keeps the last facing.
        mallard.move_dir(&mut body, 0.0);
        assert_eq!(body.velocity.x, 0.0);
        assert_eq!(mallard.facing, 1.0);
    }

    #[test]
    fn move_is_a_no_op_while_frozen() {
        let mut mallard = Mallard::default();
        let mut body = grounded_body();
        mallard.move_dir(&mut body, 1.0);
        mallard.frozen = true;

        mallard.move_dir(&mut body, -1.0);

        assert_eq!(body.velocity.x, RUN_SPEED);
        assert_eq!(mallard.facing, 1.0);
    }

    #[test]
    fn jump_requires_ground_life_and_thaw() {
        let mut body = grounded_body();

        let mut mallard = Mallard::default();
        assert!(mallard.jump(&mut body));
        assert_eq!(body.velocity.y, JUMP_SPEED);

        let mut airborne = PhysicsBody::new(Vec2::new(42.0, 60.0));
        let mut mallard = Mallard::default();
        assert!(!mallard.jump(&mut airborne));
        assert_eq!(airborne.velocity.y, 0.0);

        let mut body = grounded_body();
        let mut dead = Mallard {
            alive: false,
            ..Mallard::default()
        };
        assert!(!dead.jump(&mut body));

        let mut body = grounded_body();
        let mut frozen = Mallard {
            frozen: true,
            ..Mallard::default()
        };
        assert!(!frozen.jump(&mut body));
    }

    #[test]
    fn boost_sustains_until_stopped() {
        let mut mallard = Mallard::default();
        let mut body = grounded_body();
        assert!(mallard.jump(&mut body));

        // Airborne now; repeated calls keep applying upward velocity while boosting.
        body.touching.down = false;
        body.velocity.y = 120.0;
        assert!(!mallard.jump(&mut body));
        assert_eq!(body.velocity.y, JUMP_SPEED);

        mallard.stop_jump_boost();
        body.velocity.y = 120.0;
        assert!(!mallard.jump(&mut body));
        assert_eq!(body.velocity.y, 120.0);
    }

    #[test]
    fn action_priority_order() {
        let mallard = Mallard::default();

        let mut body = PhysicsBody::new(Vec2::new(42.0, 60.0));
        body.velocity.y = 100.0;
        assert_eq!(mallard.derive_action(&body), PlayerAction::Jump);

        body.velocity.y = -100.0;
        assert_eq!(mallard.derive_action(&body), PlayerAction::Fall);

        let mut body = grounded_body();
        body.velocity.x = 100.0;
        assert_eq!(mallard.derive_action(&body), PlayerAction::Run);

        body.velocity.x = 0.0;
        assert_eq!(mallard.derive_action(&body), PlayerAction::Stop);

        let dead = Mallard {
            alive: false,
            ..Mallard::default()
        };
        let mut body = PhysicsBody::new(Vec2::new(42.0, 60.0));
        body.velocity.y = 100.0;
        assert_eq!(dead.derive_action(&body), PlayerAction::Stop);

        let frozen = Mallard {
            frozen: true,
            ..Mallard::default()
        };
        assert_eq!(frozen.derive_action(&body), PlayerAction::Stop);
    }
}
