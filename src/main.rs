//! Application entry point: composes the Bevy runtime, the game plugins, and window
//! configuration. Everything gameplay-related lives in the library crate; this binary is
//! only the windowed host around it.

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::render::texture::ImagePlugin;
use bevy::window::{Window, WindowResizeConstraints, WindowResolution};

use mallard_platformer::app::MallardPlatformerPlugin;

fn main() {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    mallard_platformer::wasm::set_panic_hook();

    // The logical resolution matches the 960×600 playfield so world units map 1:1 to pixels
    // at the default window size. Resizing is allowed; the camera rescales to keep the whole
    // playfield visible.
    let primary_window = Window {
        title: "Mallard Platformer".to_string(),
        resolution: WindowResolution::new(960.0, 600.0),
        resizable: true,
        resize_constraints: WindowResizeConstraints {
            min_width: 480.0,
            min_height: 300.0,
            max_width: f32::INFINITY,
            max_height: f32::INFINITY,
        },
        canvas: cfg!(all(target_arch = "wasm32", feature = "web"))
            .then(|| "#bevy-canvas".to_owned()),
        ..default()
    };

    let mut default_plugins = DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(primary_window),
            ..default()
        })
        .set(ImagePlugin::default_nearest());

    #[cfg(not(target_arch = "wasm32"))]
    {
        default_plugins = default_plugins.set(AssetPlugin {
            file_path: "assets".to_owned(),
            watch_for_changes_override: Some(true),
            ..default()
        });
    }

    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        default_plugins = default_plugins.set(AssetPlugin {
            file_path: "assets".to_owned(),
            watch_for_changes_override: Some(false),
            ..default()
        });
    }

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.02, 0.02, 0.04)))
        .add_plugins(default_plugins)
        .add_plugins(MallardPlatformerPlugin)
        .run();
}
