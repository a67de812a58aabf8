//! The game over menu, shown when the countdown hits zero.

use bevy::prelude::*;

use crate::{
    game::round::{Round, StartRound},
    menus::Menu,
    screens::Screen,
    theme::widget,
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Menu::GameOver), spawn_gameover_menu);
}

fn spawn_gameover_menu(mut commands: Commands, round: Res<Round>) {
    commands.spawn((
        widget::ui_root("Game Over Menu"),
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.8)),
        GlobalZIndex(2),
        DespawnOnExit(Menu::GameOver),
        children![
            widget::header("Game Over"),
            widget::label(format!("Final Score: {}", round.score)),
            widget::button("Play Again", play_again),
            widget::button("Quit to title", quit_to_title),
        ],
    ));
}

/// Restarting is the same path as the initial start; the round module clears
/// the playfield and closes this menu.
fn play_again(_: On<Pointer<Click>>, mut start_events: MessageWriter<StartRound>) {
    start_events.write(StartRound);
}

fn quit_to_title(_: On<Pointer<Click>>, mut next_screen: ResMut<NextState<Screen>>) {
    next_screen.set(Screen::Title);
}
