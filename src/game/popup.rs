//! Transient "+1" score popups over popped bubbles.

use bevy::prelude::*;

use super::laser::BubblesPopped;
use crate::{AppSystems, PausableSystems, screens::Screen, theme::GameFont};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (spawn_score_popups, animate_score_popups)
            .in_set(AppSystems::Update)
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// How long a popup stays on screen.
const POPUP_DURATION_SECS: f32 = 0.5;

/// How far a popup floats upward over its lifetime.
const POPUP_FLOAT_DISTANCE: f32 = 30.0;

/// Component for a floating score popup.
#[derive(Component, Debug)]
pub struct ScorePopup {
    timer: Timer,
    start_y: f32,
}

/// Spawn one "+1" popup per hit bubble.
fn spawn_score_popups(
    mut commands: Commands,
    mut popped_events: MessageReader<BubblesPopped>,
    game_font: Res<GameFont>,
) {
    for event in popped_events.read() {
        for &(id, position) in &event.hits {
            let popup_pos = position + Vec2::new(10.0, 20.0);
            commands.spawn((
                Name::new(format!("Score Popup (bubble {id})")),
                ScorePopup {
                    timer: Timer::from_seconds(POPUP_DURATION_SECS, TimerMode::Once),
                    start_y: popup_pos.y,
                },
                Text2d::new("+1"),
                TextFont {
                    font: game_font.0.clone(),
                    font_size: 22.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Transform::from_translation(popup_pos.extend(10.0)),
                DespawnOnExit(Screen::Gameplay),
            ));
        }
    }
}

/// Float popups upward, fade them out, and despawn them when expired.
fn animate_score_popups(
    mut commands: Commands,
    time: Res<Time>,
    mut popup_query: Query<(Entity, &mut Transform, &mut ScorePopup, &mut TextColor)>,
) {
    for (entity, mut transform, mut popup, mut color) in &mut popup_query {
        popup.timer.tick(time.delta());
        let progress = popup.timer.fraction();

        transform.translation.y = popup.start_y + POPUP_FLOAT_DISTANCE * progress;

        // Fade out over the last 30%.
        let alpha = if progress > 0.7 {
            1.0 - (progress - 0.7) / 0.3
        } else {
            1.0
        };
        color.0 = Color::srgba(1.0, 1.0, 1.0, alpha);

        if popup.timer.finished() {
            commands.entity(entity).despawn();
        }
    }
}
