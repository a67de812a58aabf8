//! Bubble entities - the rising targets.
//!
//! Bubbles spawn on a fixed cadence near the bottom of the play area, rise in
//! a straight line, and despawn once they leave the top of the screen. Hit
//! bubbles go through a short pop animation before being removed.

use bevy::prelude::*;
use rand::Rng;

use super::round::{Round, round_running};
use crate::{AppSystems, PausableSystems, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Bubble>();
    app.register_type::<BubbleColor>();

    app.add_systems(
        Update,
        (
            (spawn_bubbles, rise_bubbles, despawn_risen_bubbles).run_if(round_running),
            animate_pop,
        )
            .in_set(AppSystems::Update)
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// Radius of every bubble. Fixed for all bubbles in this design.
pub const BUBBLE_RADIUS: f32 = 30.0;

/// Left edge of the play area.
pub const LEFT_WALL: f32 = -240.0;

/// Right edge of the play area.
pub const RIGHT_WALL: f32 = 240.0;

/// Top edge of the play area.
pub const TOP_WALL: f32 = 350.0;

/// Bottom edge of the play area.
pub const BOTTOM_WALL: f32 = -350.0;

/// Width of the play area.
pub const PLAY_WIDTH: f32 = RIGHT_WALL - LEFT_WALL;

/// Height of the play area.
pub const PLAY_HEIGHT: f32 = TOP_WALL - BOTTOM_WALL;

/// The Y position bubbles spawn at, near the bottom of the play area.
pub const SPAWN_LINE_Y: f32 = BOTTOM_WALL + 100.0;

/// Upward speed in units per second (2 units per 16 ms in the original tick).
const RISE_SPEED: f32 = 125.0;

/// Bubbles this far above the top edge are despawned. Off-screen cleanup,
/// not a miss penalty.
pub const DESPAWN_MARGIN: f32 = 60.0;

/// How long the pop animation runs before the bubble is removed.
const POP_DURATION_SECS: f32 = 0.3;

/// The seven rainbow bubble colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Component, Reflect, Default)]
#[reflect(Component)]
pub enum BubbleColor {
    #[default]
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Indigo,
    Violet,
}

impl BubbleColor {
    /// Get the actual color for rendering.
    pub fn to_color(self) -> Color {
        match self {
            BubbleColor::Red => Color::srgb(1.0, 0.0, 0.0),
            BubbleColor::Orange => Color::srgb(1.0, 0.5, 0.0),
            BubbleColor::Yellow => Color::srgb(1.0, 1.0, 0.0),
            BubbleColor::Green => Color::srgb(0.0, 1.0, 0.0),
            BubbleColor::Blue => Color::srgb(0.0, 0.0, 1.0),
            BubbleColor::Indigo => Color::srgb(0.29, 0.0, 0.51),
            BubbleColor::Violet => Color::srgb(0.55, 0.0, 1.0),
        }
    }

    /// Get a random bubble color.
    pub fn random() -> Self {
        let mut rng = rand::rng();
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// All possible bubble colors.
    pub const ALL: [BubbleColor; 7] = [
        BubbleColor::Red,
        BubbleColor::Orange,
        BubbleColor::Yellow,
        BubbleColor::Green,
        BubbleColor::Blue,
        BubbleColor::Indigo,
        BubbleColor::Violet,
    ];
}

/// Component for bubble entities.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Bubble {
    /// Per-round id, strictly increasing, never reused within a round.
    pub id: u64,
    pub color: BubbleColor,
}

/// Component marking a bubble as popping. Its presence is the Active vs
/// Popping distinction: popping bubbles no longer rise and can't be hit again.
#[derive(Component, Debug)]
pub struct Popping {
    timer: Timer,
    start_scale: Vec3,
}

impl Popping {
    pub fn new(current_scale: Vec3) -> Self {
        Self {
            timer: Timer::from_seconds(POP_DURATION_SECS, TimerMode::Once),
            start_scale: current_scale,
        }
    }
}

/// Random spawn X keeping the whole bubble inside the walls.
pub fn random_spawn_x(rng: &mut impl Rng) -> f32 {
    rng.random_range((LEFT_WALL + BUBBLE_RADIUS)..=(RIGHT_WALL - BUBBLE_RADIUS))
}

/// Spawn one bubble per spawn-timer tick while the round is running.
fn spawn_bubbles(
    mut commands: Commands,
    time: Res<Time>,
    mut round: ResMut<Round>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    round.spawn_timer.tick(time.delta());

    for _ in 0..round.spawn_timer.times_finished_this_tick() {
        let mut rng = rand::rng();
        let x = random_spawn_x(&mut rng);
        let color = BubbleColor::random();
        let id = round.allocate_bubble_id();

        commands.spawn((
            Name::new(format!("Bubble {id} ({color:?})")),
            Bubble { id, color },
            color,
            Transform::from_xyz(x, SPAWN_LINE_Y, 0.0),
            Mesh2d(meshes.add(Circle::new(BUBBLE_RADIUS))),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(color.to_color()))),
            DespawnOnExit(Screen::Gameplay),
        ));
    }
}

/// Straight-line ascent for every active bubble.
fn rise_bubbles(
    time: Res<Time>,
    mut bubble_query: Query<&mut Transform, (With<Bubble>, Without<Popping>)>,
) {
    for mut transform in &mut bubble_query {
        transform.translation.y += RISE_SPEED * time.delta_secs();
    }
}

/// Remove bubbles that have risen past the top of the screen.
fn despawn_risen_bubbles(
    mut commands: Commands,
    bubble_query: Query<(Entity, &Transform), With<Bubble>>,
) {
    for (entity, transform) in &bubble_query {
        if transform.translation.y > TOP_WALL + DESPAWN_MARGIN {
            commands.entity(entity).despawn();
        }
    }
}

/// Animate popping bubbles (scale up, then shrink to nothing) and despawn
/// when done. Matches the original timing: 0.2 s up to 1.5x, 0.1 s down.
fn animate_pop(
    mut commands: Commands,
    time: Res<Time>,
    mut popping_query: Query<(Entity, &mut Transform, &mut Popping)>,
) {
    for (entity, mut transform, mut popping) in &mut popping_query {
        popping.timer.tick(time.delta());
        let progress = popping.timer.fraction();

        let scale = if progress < 2.0 / 3.0 {
            let t = progress * 1.5;
            popping.start_scale.lerp(popping.start_scale * 1.5, t)
        } else {
            let t = (progress - 2.0 / 3.0) * 3.0;
            (popping.start_scale * 1.5).lerp(Vec3::ZERO, t)
        };
        transform.scale = scale;

        if popping.timer.finished() {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_has_seven_colors() {
        assert_eq!(BubbleColor::ALL.len(), 7);
    }

    #[test]
    fn test_random_color_is_in_palette() {
        for _ in 0..50 {
            assert!(BubbleColor::ALL.contains(&BubbleColor::random()));
        }
    }

    #[test]
    fn test_spawn_x_keeps_bubble_inside_walls() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let x = random_spawn_x(&mut rng);
            assert!(x - BUBBLE_RADIUS >= LEFT_WALL);
            assert!(x + BUBBLE_RADIUS <= RIGHT_WALL);
        }
    }
}
