//! Camera presentation. The playfield is a single 960×600 screen, so the camera sits at the
//! world center and only rescales as the window resizes, never showing outside the play area.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::physics::WorldBounds;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera)
            .add_systems(Update, fit_world_to_window);
    }
}

/// Marker so the fit system can locate the camera entity without relying on names.
#[derive(Component)]
pub struct WorldCamera;

fn setup_camera(mut commands: Commands, bounds: Res<WorldBounds>) {
    commands.spawn((
        Name::new("MainCamera"),
        WorldCamera,
        Camera2dBundle {
            transform: Transform::from_translation(bounds.center().extend(999.9)),
            ..default()
        },
    ));
}

/// Picks the orthographic scale that keeps the whole world visible regardless of window shape.
fn fit_world_to_window(
    bounds: Res<WorldBounds>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cameras: Query<&mut OrthographicProjection, With<WorldCamera>>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok(mut projection) = cameras.get_single_mut() else {
        return;
    };

    let window_size = window.resolution.size();
    if window_size.x <= 0.0 || window_size.y <= 0.0 {
        return;
    }

    let size = bounds.size();
    let width_ratio = size.x / window_size.x;
    let height_ratio = size.y / window_size.y;
    projection.scale = width_ratio.max(height_ratio).max(0.0001);
}
