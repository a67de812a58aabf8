//! Debug visualization for the play area.
//!
//! Toggle with the 'D' key during gameplay.
//! Shows:
//! - Play area walls
//! - The spawn line and the off-screen despawn cutoff
//! - Hit radii around active bubbles

use bevy::{color::palettes::css, input::common_conditions::input_just_pressed, prelude::*};

use super::{
    bubble::{
        BOTTOM_WALL, BUBBLE_RADIUS, Bubble, DESPAWN_MARGIN, LEFT_WALL, Popping, RIGHT_WALL,
        SPAWN_LINE_Y, TOP_WALL,
    },
    laser::{HIT_MARGIN, LASER_HALF_THICKNESS},
};
use crate::screens::Screen;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<DebugOverlayVisible>();

    app.add_systems(
        Update,
        toggle_debug.run_if(in_state(Screen::Gameplay).and(input_just_pressed(KeyCode::KeyD))),
    );

    app.add_systems(
        Update,
        draw_debug_overlay.run_if(in_state(Screen::Gameplay).and(debug_visible)),
    );
}

/// Resource tracking whether the debug overlay is shown.
#[derive(Resource, Default)]
struct DebugOverlayVisible(bool);

fn debug_visible(visible: Res<DebugOverlayVisible>) -> bool {
    visible.0
}

fn toggle_debug(mut visible: ResMut<DebugOverlayVisible>) {
    visible.0 = !visible.0;
    info!("Debug overlay: {}", visible.0);
}

fn draw_debug_overlay(
    mut gizmos: Gizmos,
    bubble_query: Query<&Transform, (With<Bubble>, Without<Popping>)>,
) {
    // Walls
    gizmos.line_2d(
        Vec2::new(LEFT_WALL, BOTTOM_WALL),
        Vec2::new(LEFT_WALL, TOP_WALL),
        css::YELLOW,
    );
    gizmos.line_2d(
        Vec2::new(RIGHT_WALL, BOTTOM_WALL),
        Vec2::new(RIGHT_WALL, TOP_WALL),
        css::YELLOW,
    );
    gizmos.line_2d(
        Vec2::new(LEFT_WALL, TOP_WALL),
        Vec2::new(RIGHT_WALL, TOP_WALL),
        css::YELLOW,
    );
    gizmos.line_2d(
        Vec2::new(LEFT_WALL, BOTTOM_WALL),
        Vec2::new(RIGHT_WALL, BOTTOM_WALL),
        css::YELLOW,
    );

    // Spawn line
    gizmos.line_2d(
        Vec2::new(LEFT_WALL, SPAWN_LINE_Y),
        Vec2::new(RIGHT_WALL, SPAWN_LINE_Y),
        css::LIGHT_GREEN,
    );

    // Despawn cutoff
    let cutoff = TOP_WALL + DESPAWN_MARGIN;
    gizmos.line_2d(
        Vec2::new(LEFT_WALL, cutoff),
        Vec2::new(RIGHT_WALL, cutoff),
        css::ORANGE_RED,
    );

    // Hit radii (bubble radius plus beam half-thickness plus margin)
    let hit_radius = BUBBLE_RADIUS + LASER_HALF_THICKNESS + HIT_MARGIN;
    for transform in &bubble_query {
        gizmos.circle_2d(
            Isometry2d::from_translation(transform.translation.truncate()),
            hit_radius,
            css::WHITE.with_alpha(0.4),
        );
    }
}
