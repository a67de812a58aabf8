//! Laser beams and hit detection.
//!
//! A fired beam is a finite segment from the muzzle along the fire angle,
//! long enough to always exit the play area. Every active bubble close enough
//! to the segment is hit in the same resolution pass; there is no early exit
//! and no z-ordering, so one beam can pop several bubbles at once.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

use super::{
    GameAssets,
    bubble::{BUBBLE_RADIUS, Bubble, PLAY_HEIGHT, Popping},
    geometry,
};
use crate::{AppSystems, PausableSystems, audio::sound_effect, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.add_message::<FireLaser>();
    app.add_message::<BubblesPopped>();

    app.add_systems(
        Update,
        (
            fire_laser.in_set(AppSystems::Update),
            despawn_laser_visuals.in_set(AppSystems::TickTimers),
        )
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// Beam length: 1.5x the play-area height, so the segment always exits the
/// visible area no matter where it starts.
pub const LASER_LENGTH: f32 = 1.5 * PLAY_HEIGHT;

/// The beam is a thin rectangle, not an infinitely thin ray.
pub const LASER_HALF_THICKNESS: f32 = 2.0;

/// Forgiveness for touch imprecision.
pub const HIT_MARGIN: f32 = 2.0;

/// How long the beam visual stays on screen. Matches the fire cooldown, as
/// in the original.
const LASER_VISIBLE_SECS: f32 = 0.3;

/// Message to fire a beam from the gun muzzle.
#[derive(Message, Debug, Clone)]
pub struct FireLaser {
    pub origin: Vec2,
    pub angle: f32,
}

/// Message sent when a beam pops at least one bubble. Carries the bubble id
/// and position of every hit, for scoring and popups.
#[derive(Message, Debug, Clone)]
pub struct BubblesPopped {
    pub hits: Vec<(u64, Vec2)>,
}

/// One fired shot, used only for the instant of hit resolution.
#[derive(Debug, Clone, Copy)]
pub struct Beam {
    pub origin: Vec2,
    pub angle: f32,
    pub length: f32,
}

impl Beam {
    pub fn new(origin: Vec2, angle: f32) -> Self {
        Self {
            origin,
            angle,
            length: LASER_LENGTH,
        }
    }

    /// The far endpoint of the beam segment.
    pub fn end(&self) -> Vec2 {
        self.origin + self.length * Vec2::from_angle(self.angle)
    }
}

/// Test the beam against a snapshot of bubble centers. Returns the ids of all
/// bubbles whose center lies within `radius + half thickness + margin` of the
/// clamped segment. Does not mutate anything; the caller applies pops and
/// score atomically with respect to this result.
pub fn resolve_hits<I: Copy>(beam: &Beam, bubbles: impl IntoIterator<Item = (I, Vec2)>) -> Vec<I> {
    let end = beam.end();
    let threshold = BUBBLE_RADIUS + LASER_HALF_THICKNESS + HIT_MARGIN;
    let threshold_sq = threshold * threshold;

    bubbles
        .into_iter()
        .filter(|(_, center)| {
            geometry::point_to_segment_distance_squared(*center, beam.origin, end) <= threshold_sq
        })
        .map(|(id, _)| id)
        .collect()
}

/// Component for the transient beam visual.
#[derive(Component, Debug)]
pub struct LaserVisual {
    timer: Timer,
}

/// Resolve an accepted fire: spawn the beam visual, pop every bubble the
/// segment touches, and play the cues.
fn fire_laser(
    mut commands: Commands,
    mut fire_events: MessageReader<FireLaser>,
    bubble_query: Query<(Entity, &Bubble, &Transform), Without<Popping>>,
    mut popped_events: MessageWriter<BubblesPopped>,
    game_assets: Res<GameAssets>,
) {
    for event in fire_events.read() {
        // Fire cue on every accepted fire.
        commands.spawn(sound_effect(game_assets.laser_sound.clone()));

        let beam = Beam::new(event.origin, event.angle);
        spawn_laser_visual(&mut commands, &beam);

        let hits = resolve_hits(
            &beam,
            bubble_query
                .iter()
                .map(|(entity, _, transform)| (entity, transform.translation.truncate())),
        );
        if hits.is_empty() {
            continue;
        }

        // One pop cue per resolution pass, no matter how many bubbles went.
        commands.spawn(sound_effect(game_assets.pop_sound.clone()));

        let mut popped = Vec::with_capacity(hits.len());
        for entity in hits {
            let Ok((_, bubble, transform)) = bubble_query.get(entity) else {
                continue;
            };
            popped.push((bubble.id, transform.translation.truncate()));
            commands.entity(entity).insert(Popping::new(transform.scale));
        }

        info!("Laser popped {} bubble(s)", popped.len());
        popped_events.write(BubblesPopped { hits: popped });
    }
}

/// Spawn the red beam sprite along the segment.
fn spawn_laser_visual(commands: &mut Commands, beam: &Beam) {
    let midpoint = beam.origin + (beam.length / 2.0) * Vec2::from_angle(beam.angle);

    commands.spawn((
        Name::new("Laser Beam"),
        LaserVisual {
            timer: Timer::from_seconds(LASER_VISIBLE_SECS, TimerMode::Once),
        },
        Sprite {
            color: Color::srgb(1.0, 0.1, 0.1),
            custom_size: Some(Vec2::new(LASER_HALF_THICKNESS * 2.0, beam.length)),
            ..default()
        },
        // The sprite's long axis is Y, so rotate it from vertical.
        Transform::from_translation(midpoint.extend(5.0))
            .with_rotation(Quat::from_rotation_z(beam.angle - FRAC_PI_2)),
        DespawnOnExit(Screen::Gameplay),
    ));
}

/// Remove beam visuals when their display window elapses.
fn despawn_laser_visuals(
    mut commands: Commands,
    time: Res<Time>,
    mut laser_query: Query<(Entity, &mut LaserVisual)>,
) {
    for (entity, mut laser) in &mut laser_query {
        laser.timer.tick(time.delta());
        if laser.timer.finished() {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beam_straight_up() -> Beam {
        // Gun center at the origin, tap straight above: fire angle is +90.
        Beam::new(Vec2::ZERO, FRAC_PI_2)
    }

    #[test]
    fn test_bubble_on_beam_line_is_hit() {
        let hits = resolve_hits(&beam_straight_up(), [(1u64, Vec2::new(0.0, 250.0))]);
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn test_bubble_far_to_the_side_is_missed() {
        let hits = resolve_hits(&beam_straight_up(), [(1u64, Vec2::new(200.0, 250.0))]);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_bubble_behind_origin_is_never_hit() {
        let hits = resolve_hits(&beam_straight_up(), [(1u64, Vec2::new(0.0, -100.0))]);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_bubble_past_beam_end_is_missed() {
        let hits = resolve_hits(
            &beam_straight_up(),
            [(1u64, Vec2::new(0.0, LASER_LENGTH + 100.0))],
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn test_hit_threshold_boundary() {
        let threshold = BUBBLE_RADIUS + LASER_HALF_THICKNESS + HIT_MARGIN;
        let on_edge = (1u64, Vec2::new(threshold, 100.0));
        let just_outside = (2u64, Vec2::new(threshold + 0.5, 100.0));

        let hits = resolve_hits(&beam_straight_up(), [on_edge, just_outside]);
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn test_one_beam_hits_multiple_bubbles() {
        let hits = resolve_hits(
            &beam_straight_up(),
            [
                (1u64, Vec2::new(0.0, 100.0)),
                (2u64, Vec2::new(0.0, 100.0)),
                (3u64, Vec2::new(10.0, 300.0)),
                (4u64, Vec2::new(150.0, 300.0)),
            ],
        );
        assert_eq!(hits, vec![1, 2, 3]);
    }
}
