//! HUD overlay: coin counter and key indicator, fed from the read-only session values.
//!
//! UI entities live in Bevy's ECS like everything else; the text nodes are spawned once at
//! startup and only their string content changes afterwards.

use bevy::prelude::*;

use crate::session::SessionState;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_hud)
            .add_systems(Update, update_hud);
    }
}

#[derive(Component)]
struct CoinCounter;

#[derive(Component)]
struct KeyIndicator;

fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            Name::new("Hud"),
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    left: Val::Px(10.0),
                    top: Val::Px(10.0),
                    column_gap: Val::Px(16.0),
                    align_items: AlignItems::Center,
                    ..default()
                },
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                KeyIndicator,
                TextBundle::from_section(
                    "key: no",
                    TextStyle {
                        font_size: 28.0,
                        color: Color::srgba(0.1, 0.1, 0.1, 1.0),
                        ..default()
                    },
                ),
            ));
            parent.spawn((
                CoinCounter,
                TextBundle::from_section(
                    "coins x0",
                    TextStyle {
                        font_size: 28.0,
                        color: Color::srgba(0.1, 0.1, 0.1, 1.0),
                        ..default()
                    },
                ),
            ));
        });
}

fn update_hud(
    session: Res<SessionState>,
    mut counters: Query<&mut Text, (With<CoinCounter>, Without<KeyIndicator>)>,
    mut indicators: Query<&mut Text, (With<KeyIndicator>, Without<CoinCounter>)>,
) {
    if !session.is_changed() {
        return;
    }

    for mut text in &mut counters {
        text.sections[0].value = format!("coins x{}", session.coins);
    }
    for mut text in &mut indicators {
        text.sections[0].value = if session.has_key {
            "key: yes".to_owned()
        } else {
            "key: no".to_owned()
        };
    }
}
