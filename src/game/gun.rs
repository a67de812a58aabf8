//! The laser gun - aiming, dragging, and the fire-rate gate.
//!
//! A tap rotates the gun toward the tap point and attempts a fire; holding
//! the button and moving the pointer drags the gun around 1:1. Firing is
//! gated by a single-shot cooldown latch.

use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use bevy::{prelude::*, window::PrimaryWindow};

use super::{GameAssets, geometry, laser::FireLaser, round::{StartRound, round_running}};
use crate::{AppSystems, PausableSystems, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Gun>();
    app.register_type::<FireGate>();
    app.init_resource::<FireGate>();

    app.add_systems(OnEnter(Screen::Gameplay), spawn_gun);

    app.add_systems(
        Update,
        (
            tick_fire_gate.in_set(AppSystems::TickTimers),
            // Dragging stays live in every phase; only taps are gated on a
            // running round.
            (handle_tap.run_if(round_running), drag_gun).in_set(AppSystems::RecordInput),
        )
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );

    // Runs outside `PausableSystems`: the restart request arrives while the
    // game-over menu still has gameplay paused.
    app.add_systems(
        Update,
        reset_gun
            .in_set(AppSystems::Update)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// Rendered size of the gun sprite.
const GUN_SIZE: Vec2 = Vec2::new(75.0, 300.0);

/// The gun's rest position (center of the sprite), near the bottom.
const GUN_REST_POSITION: Vec2 = Vec2::new(0.0, -300.0);

/// Distance from gun center to the muzzle tip, measured along the fire angle.
pub const GUN_TIP_OFFSET: f32 = 149.0;

/// Seconds the fire gate stays closed after an accepted fire.
const FIRE_COOLDOWN_SECS: f32 = 0.3;

/// The gun art points straight up at rest, so the drawn sprite needs a
/// quarter-turn correction relative to the fire angle.
const SPRITE_UP_CORRECTION: f32 = -FRAC_PI_2;

/// Marker component for the gun entity.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Gun;

/// The single-shot cooldown latch. An attempted fire while the gate is closed
/// has zero side effects - no queued shot.
#[derive(Resource, Debug, Reflect)]
#[reflect(Resource)]
pub struct FireGate {
    cooldown: Timer,
}

impl Default for FireGate {
    fn default() -> Self {
        let mut cooldown = Timer::from_seconds(FIRE_COOLDOWN_SECS, TimerMode::Once);
        // The gate starts open.
        cooldown.tick(Duration::from_secs_f32(FIRE_COOLDOWN_SECS));
        Self { cooldown }
    }
}

impl FireGate {
    /// Attempt to fire. Succeeds at most once per cooldown window.
    pub fn try_fire(&mut self) -> bool {
        if self.cooldown.finished() {
            self.cooldown.reset();
            true
        } else {
            false
        }
    }

    pub fn tick(&mut self, delta: Duration) {
        self.cooldown.tick(delta);
    }

    /// Reopen the gate immediately. A restarted round carries no leftover
    /// cooldown from the previous one.
    pub fn reopen(&mut self) {
        let remaining = self.cooldown.duration();
        self.cooldown.tick(remaining);
    }
}

/// The result of aiming at a tap point.
#[derive(Debug, Clone, Copy)]
pub struct Aim {
    /// Direction from gun center to the tap point, in radians.
    pub fire_angle: f32,
    /// Rotation for the gun sprite (fire angle plus the art correction).
    pub sprite_angle: f32,
    /// Where the beam starts.
    pub muzzle: Vec2,
}

/// Compute the fire direction, sprite rotation and beam origin for a tap.
///
/// The muzzle offset deliberately follows the raw fire angle rather than the
/// corrected sprite angle, so the tip tracks the aim direction exactly. This
/// coupling is preserved observed behavior; changing it would shift the
/// hit-detection geometry.
pub fn compute_aim(gun_center: Vec2, tap: Vec2) -> Aim {
    let fire_angle = geometry::angle_between(gun_center, tap);
    Aim {
        fire_angle,
        sprite_angle: fire_angle + SPRITE_UP_CORRECTION,
        muzzle: gun_center + GUN_TIP_OFFSET * Vec2::from_angle(fire_angle),
    }
}

/// Spawn the gun at its rest position.
fn spawn_gun(mut commands: Commands, game_assets: Res<GameAssets>) {
    commands.spawn((
        Name::new("Gun"),
        Gun,
        Sprite {
            image: game_assets.gun.clone(),
            custom_size: Some(GUN_SIZE),
            ..default()
        },
        Transform::from_translation(GUN_REST_POSITION.extend(2.0)),
        DespawnOnExit(Screen::Gameplay),
    ));
    info!("Gun spawned at {:?}", GUN_REST_POSITION);
}

/// Re-center the gun and reopen the fire gate when a new round starts.
fn reset_gun(
    mut start_events: MessageReader<StartRound>,
    mut gate: ResMut<FireGate>,
    mut gun_query: Query<&mut Transform, With<Gun>>,
) {
    if start_events.read().next().is_none() {
        return;
    }
    gate.reopen();
    if let Ok(mut transform) = gun_query.single_mut() {
        transform.translation = GUN_REST_POSITION.extend(2.0);
        transform.rotation = Quat::IDENTITY;
    }
}

/// Keep the cooldown latch ticking.
fn tick_fire_gate(time: Res<Time>, mut gate: ResMut<FireGate>) {
    gate.tick(time.delta());
}

/// A tap aims the gun at the cursor and attempts a fire.
fn handle_tap(
    mouse_input: Res<ButtonInput<MouseButton>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
    mut gun_query: Query<&mut Transform, With<Gun>>,
    mut gate: ResMut<FireGate>,
    mut fire_events: MessageWriter<FireLaser>,
) {
    if !mouse_input.just_pressed(MouseButton::Left) {
        return;
    }

    let Ok(window) = window_query.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let Some(tap) = window
        .cursor_position()
        .and_then(|p| camera.viewport_to_world_2d(camera_transform, p).ok())
    else {
        return;
    };
    let Ok(mut transform) = gun_query.single_mut() else {
        return;
    };

    let gun_center = transform.translation.truncate();
    let aim = compute_aim(gun_center, tap);
    transform.rotation = Quat::from_rotation_z(aim.sprite_angle);

    if gate.try_fire() {
        fire_events.write(FireLaser {
            origin: aim.muzzle,
            angle: aim.fire_angle,
        });
    }
}

/// Move the gun 1:1 with the pointer while the button is held. A fresh press
/// is a tap; dragging only applies from the following frames.
fn drag_gun(
    mouse_input: Res<ButtonInput<MouseButton>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
    mut gun_query: Query<&mut Transform, With<Gun>>,
) {
    if !mouse_input.pressed(MouseButton::Left) || mouse_input.just_pressed(MouseButton::Left) {
        return;
    }

    let Ok(window) = window_query.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let Some(cursor) = window
        .cursor_position()
        .and_then(|p| camera.viewport_to_world_2d(camera_transform, p).ok())
    else {
        return;
    };
    let Ok(mut transform) = gun_query.single_mut() else {
        return;
    };

    transform.translation.x = cursor.x;
    transform.translation.y = cursor.y;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aim_straight_up() {
        let aim = compute_aim(Vec2::ZERO, Vec2::new(0.0, 200.0));
        assert!((aim.fire_angle - FRAC_PI_2).abs() < 1e-6);
        assert!((aim.sprite_angle).abs() < 1e-6);
        assert!((aim.muzzle - Vec2::new(0.0, GUN_TIP_OFFSET)).length() < 1e-3);
    }

    #[test]
    fn test_aim_right_keeps_muzzle_on_fire_angle() {
        let aim = compute_aim(Vec2::new(100.0, -50.0), Vec2::new(300.0, -50.0));
        assert!(aim.fire_angle.abs() < 1e-6);
        assert!((aim.sprite_angle + FRAC_PI_2).abs() < 1e-6);
        // The tip offset follows the fire angle, not the corrected sprite angle.
        assert!((aim.muzzle - Vec2::new(100.0 + GUN_TIP_OFFSET, -50.0)).length() < 1e-3);
    }

    #[test]
    fn test_gate_rejects_while_closed() {
        let mut gate = FireGate::default();
        assert!(gate.try_fire());
        assert!(!gate.try_fire());
        assert!(!gate.try_fire());
    }

    #[test]
    fn test_gate_accepts_exactly_one_fire_per_window() {
        let mut gate = FireGate::default();
        assert!(gate.try_fire());

        // Hammer the gate every 50 ms; only the attempt at the 300 ms mark
        // may be accepted.
        let mut accepted = 0;
        for _ in 0..6 {
            gate.tick(Duration::from_millis(50));
            if gate.try_fire() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
    }

    #[test]
    fn test_gate_reopens_on_restart() {
        let mut gate = FireGate::default();
        assert!(gate.try_fire());
        // Restart mid-cooldown; the new round starts with an open gate.
        gate.tick(Duration::from_millis(50));
        gate.reopen();
        assert!(gate.try_fire());
    }

    #[test]
    fn test_gate_reopens_after_cooldown() {
        let mut gate = FireGate::default();
        assert!(gate.try_fire());
        gate.tick(Duration::from_secs_f32(FIRE_COOLDOWN_SECS));
        assert!(gate.try_fire());
    }
}
