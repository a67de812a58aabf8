//! The main game module for Bubble Popper.
//!
//! This module contains all the gameplay logic including:
//! - Vector math for aiming and hit testing
//! - The rising bubble field (spawn, ascent, pop lifecycle)
//! - The laser gun (aim from taps, fire-rate gate, dragging)
//! - Beam hit detection
//! - The timed round state machine, score and HUD

mod bubble;
mod debug;
mod geometry;
mod gun;
mod laser;
mod popup;
pub mod round;

use bevy::prelude::*;

use crate::{asset_tracking::LoadResource, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<GameAssets>();
    app.load_resource::<GameAssets>();

    app.add_plugins((
        bubble::plugin,
        debug::plugin,
        gun::plugin,
        laser::plugin,
        popup::plugin,
        round::plugin,
    ));
}

/// Holds game asset handles for rendering and sound.
#[derive(Resource, Asset, Clone, Reflect)]
#[reflect(Resource)]
pub struct GameAssets {
    #[dependency]
    pub gun: Handle<Image>,
    #[dependency]
    pub sky: Handle<Image>,
    #[dependency]
    pub laser_sound: Handle<AudioSource>,
    #[dependency]
    pub pop_sound: Handle<AudioSource>,
}

impl FromWorld for GameAssets {
    fn from_world(world: &mut World) -> Self {
        let assets = world.resource::<AssetServer>();
        Self {
            gun: assets.load("images/rainbow_gun.png"),
            sky: assets.load("images/sky.png"),
            laser_sound: assets.load("audio/sound_effects/laser.ogg"),
            pop_sound: assets.load("audio/sound_effects/pop.ogg"),
        }
    }
}

/// System to spawn the game level when entering gameplay.
/// Called from `screens/gameplay.rs` on `OnEnter(Screen::Gameplay)`.
pub fn spawn_game(mut commands: Commands, game_assets: Res<GameAssets>) {
    commands.spawn((
        Name::new("Game"),
        Transform::default(),
        Visibility::default(),
        DespawnOnExit(Screen::Gameplay),
    ));

    // Sky background behind the bubbles.
    commands.spawn((
        Name::new("Sky Background"),
        Sprite {
            image: game_assets.sky.clone(),
            custom_size: Some(Vec2::new(bubble::PLAY_WIDTH, bubble::PLAY_HEIGHT)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, -2.0),
        DespawnOnExit(Screen::Gameplay),
    ));

    info!("Game spawned - bubble popper ready!");
}
