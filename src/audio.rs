//! Audio helpers and the persisted audio settings.
//!
//! Sound playback is fire-and-forget: one-shot effects despawn themselves
//! when finished, so the simulation never waits on the audio subsystem.

use bevy::{audio::Volume, prelude::*};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Music>();
    app.register_type::<SoundEffect>();

    app.add_systems(Startup, load_audio_settings);
    app.add_systems(
        Update,
        (apply_global_volume, save_audio_settings).run_if(resource_changed::<GlobalVolume>),
    );
}

/// The global volume applied before any saved settings are loaded.
pub const DEFAULT_VOLUME: Volume = Volume::Linear(0.5);

/// An organizational marker component that should be added to a spawned
/// [`AudioPlayer`] if it's in the general "music" category (e.g. global
/// background music, soundtrack).
///
/// This can then be used to query for and operate on sounds in that category.
#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct Music;

/// A music audio instance.
pub fn music(handle: Handle<AudioSource>) -> impl Bundle {
    (AudioPlayer(handle), PlaybackSettings::LOOP, Music)
}

/// An organizational marker component that should be added to a spawned
/// [`AudioPlayer`] if it's in the general "sound effect" category (e.g.
/// footsteps, the sound of a magic spell, a door opening).
///
/// This can then be used to query for and operate on sounds in that category.
#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct SoundEffect;

/// A sound effect audio instance.
pub fn sound_effect(handle: Handle<AudioSource>) -> impl Bundle {
    (AudioPlayer(handle), PlaybackSettings::DESPAWN, SoundEffect)
}

/// [`GlobalVolume`] doesn't apply to already-running audio entities, so this
/// system will update them.
fn apply_global_volume(
    global_volume: Res<GlobalVolume>,
    mut audio_query: Query<(&PlaybackSettings, &mut AudioSink)>,
) {
    for (playback, mut sink) in &mut audio_query {
        sink.set_volume(global_volume.volume * playback.volume);
    }
}

/// Persisted audio settings, stored as JSON in the user's data directory.
#[derive(Debug, Serialize, Deserialize)]
struct AudioSettings {
    volume: f32,
}

impl AudioSettings {
    fn file_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("bubble_popper").join("settings.json"))
    }

    fn load() -> Option<Self> {
        let path = Self::file_path()?;
        if !path.exists() {
            info!("No settings file found at {:?}, using defaults", path);
            return None;
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    info!("Loaded audio settings from {:?}", path);
                    Some(settings)
                }
                Err(e) => {
                    warn!("Failed to parse audio settings: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to read audio settings file: {}", e);
                None
            }
        }
    }

    fn save(&self) {
        let Some(path) = Self::file_path() else {
            warn!("Could not determine data directory for audio settings");
            return;
        };

        if let Some(parent) = path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warn!("Failed to create settings directory: {}", e);
            return;
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(&path, json) {
                    warn!("Failed to write audio settings: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize audio settings: {}", e),
        }
    }
}

/// Apply the saved volume on startup, if a settings file exists.
fn load_audio_settings(mut global_volume: ResMut<GlobalVolume>) {
    if let Some(settings) = AudioSettings::load() {
        global_volume.volume = Volume::Linear(settings.volume.clamp(0.0, 3.0));
    }
}

/// Save the volume whenever it changes (e.g. from the settings menu).
fn save_audio_settings(global_volume: Res<GlobalVolume>) {
    AudioSettings {
        volume: global_volume.volume.to_linear(),
    }
    .save();
}
