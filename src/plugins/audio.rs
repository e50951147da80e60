use bevy::prelude::*;
use bevy_kira_audio::prelude::*;
use bevy_kira_audio::AudioSource;

use crate::events::FowCheckpointEvent;
use crate::plugins::core::GameState;

/// Positional effects further than this from the listener are skipped.
const FX_AUDIBLE_RANGE: f32 = 2000.0;

/// Resource holding mixer levels and the distance-attenuation rule for
/// positional effects.
#[derive(Resource, Debug, Clone)]
pub struct SoundMixer {
    pub fx_volume: f64,
    pub music_volume: f64,
}

impl Default for SoundMixer {
    fn default() -> Self {
        Self {
            fx_volume: 0.8,
            music_volume: 0.3,
        }
    }
}

impl SoundMixer {
    /// Playback volume for an effect at `source` heard from `listener`,
    /// attenuated linearly with distance. Returns None when the source is
    /// out of audible range and the play call should be skipped entirely.
    pub fn fx_volume_at(&self, source: Vec2, listener: Vec2) -> Option<f64> {
        let distance = source.distance(listener);
        if distance >= FX_AUDIBLE_RANGE {
            return None;
        }
        let attenuation = 1.0 - (distance / FX_AUDIBLE_RANGE) as f64;
        Some(self.fx_volume * attenuation)
    }

    /// Plays a positional effect, attenuated by listener distance.
    /// Out-of-range sources are skipped without touching the audio backend.
    pub fn play_fx(
        &self,
        audio: &Audio,
        sound: Handle<AudioSource>,
        source: Vec2,
        listener: Vec2,
    ) {
        if let Some(volume) = self.fx_volume_at(source, listener) {
            audio.play(sound).with_volume(volume);
        }
    }

    /// Starts looped music at the mixer's music level.
    pub fn play_music(&self, audio: &Audio, sound: Handle<AudioSource>) {
        audio.play(sound).looped().with_volume(self.music_volume);
    }
}

pub struct SoundPlugin;

impl Plugin for SoundPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(AudioPlugin)
            .init_resource::<SoundMixer>()
            .add_systems(OnEnter(GameState::Playing), start_ambient_music)
            .add_systems(
                Update,
                checkpoint_sound_system.run_if(in_state(GameState::Playing)),
            );
    }
}

fn start_ambient_music(
    asset_server: Res<AssetServer>,
    audio: Res<Audio>,
    mixer: Res<SoundMixer>,
) {
    mixer.play_music(&audio, asset_server.load("audio/ambient.ogg"));
    info!("Ambient music started at volume {}", mixer.music_volume);
}

/// Plays a blip at the camera when a fog checkpoint is taken or restored.
fn checkpoint_sound_system(
    mut events: EventReader<FowCheckpointEvent>,
    asset_server: Res<AssetServer>,
    audio: Res<Audio>,
    mixer: Res<SoundMixer>,
    camera: Query<&Transform, With<Camera2d>>,
) {
    let listener = camera
        .get_single()
        .map(|t| t.translation.truncate())
        .unwrap_or(Vec2::ZERO);
    for _ in events.read() {
        mixer.play_fx(
            &audio,
            asset_server.load("audio/ui_blip.ogg"),
            listener,
            listener,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_volume_full_at_listener() {
        let mixer = SoundMixer::default();
        let vol = mixer.fx_volume_at(Vec2::ZERO, Vec2::ZERO).unwrap();
        assert!((vol - mixer.fx_volume).abs() < 1e-9);
    }

    #[test]
    fn test_fx_volume_attenuates_with_distance() {
        let mixer = SoundMixer::default();
        let half = mixer
            .fx_volume_at(Vec2::new(FX_AUDIBLE_RANGE / 2.0, 0.0), Vec2::ZERO)
            .unwrap();
        assert!((half - mixer.fx_volume * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_fx_out_of_range_is_skipped() {
        let mixer = SoundMixer::default();
        assert!(mixer
            .fx_volume_at(Vec2::new(FX_AUDIBLE_RANGE + 1.0, 0.0), Vec2::ZERO)
            .is_none());
    }
}
