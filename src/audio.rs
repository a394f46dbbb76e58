//! Audio cue plumbing. The simulation only ever asks for "play cue X" through the `PlayCue`
//! event; decoding and playback stay on the host side of the fence.
//!
//! Bevy's asset system reference-counts handles; the `AudioHandles` resource keeps the optional
//! clip handles alive for the lifetime of the app.

use bevy::prelude::*;

/// Sound effects the gameplay core can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Jump,
    Coin,
    Stomp,
    Key,
    Door,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayCue(pub Cue);

/// Registers cue playback. Presentation-only: the `PlayCue` event itself is registered with the
/// gameplay plugins so headless runs can emit it freely.
pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AudioHandles>()
            .add_systems(Startup, load_audio_handles)
            .add_systems(Update, play_cues);
    }
}

/// Optional handles to game-wide audio clips. Each `Handle` is a cheap cloneable pointer into
/// Bevy's asset storage.
#[derive(Resource, Default)]
pub struct AudioHandles {
    pub jump: Option<Handle<AudioSource>>,
    pub coin: Option<Handle<AudioSource>>,
    pub stomp: Option<Handle<AudioSource>>,
    pub key: Option<Handle<AudioSource>>,
    pub door: Option<Handle<AudioSource>>,
}

impl AudioHandles {
    fn get(&self, cue: Cue) -> Option<&Handle<AudioSource>> {
        match cue {
            Cue::Jump => self.jump.as_ref(),
            Cue::Coin => self.coin.as_ref(),
            Cue::Stomp => self.stomp.as_ref(),
            Cue::Key => self.key.as_ref(),
            Cue::Door => self.door.as_ref(),
        }
    }
}

/// Queues asynchronous clip loads. Until real files are provided under `assets/audio/`, missing
/// assets simply leave the handles pointing at nothing and cues become no-ops.
fn load_audio_handles(asset_server: Res<AssetServer>, mut handles: ResMut<AudioHandles>) {
    handles.jump = Some(asset_server.load("audio/jump.ogg"));
    handles.coin = Some(asset_server.load("audio/coin.ogg"));
    handles.stomp = Some(asset_server.load("audio/stomp.ogg"));
    handles.key = Some(asset_server.load("audio/key.ogg"));
    handles.door = Some(asset_server.load("audio/door.ogg"));

    info!("Queued audio clips. Add files under assets/audio/ to enable playback.");
}

fn play_cues(mut commands: Commands, mut cues: EventReader<PlayCue>, handles: Res<AudioHandles>) {
    for PlayCue(cue) in cues.read() {
        if let Some(source) = handles.get(*cue) {
            commands.spawn(AudioBundle {
                source: source.clone(),
                settings: PlaybackSettings::DESPAWN,
            });
        }
    }
}
