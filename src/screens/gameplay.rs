//! The screen state for the main gameplay.

use bevy::{input::common_conditions::input_just_pressed, prelude::*};

use crate::{Pause, audio::music, game, menus::Menu, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        OnEnter(Screen::Gameplay),
        (game::spawn_game, start_gameplay_music),
    );

    // Toggle pause on Escape.
    app.add_systems(
        Update,
        open_pause_menu.run_if(
            in_state(Screen::Gameplay)
                .and(in_state(Menu::None))
                .and(input_just_pressed(KeyCode::Escape)),
        ),
    );
    app.add_systems(OnExit(Screen::Gameplay), (close_menu, unpause));
    app.add_systems(
        OnEnter(Menu::None),
        unpause.run_if(in_state(Screen::Gameplay)),
    );
    app.add_systems(
        OnExit(Menu::None),
        pause.run_if(in_state(Screen::Gameplay)),
    );
}

fn start_gameplay_music(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.spawn((
        Name::new("Gameplay Music"),
        music(asset_server.load("audio/music/gameplay_loop.ogg")),
        DespawnOnExit(Screen::Gameplay),
    ));
}

fn open_pause_menu(mut next_menu: ResMut<NextState<Menu>>) {
    next_menu.set(Menu::Pause);
}

fn close_menu(mut next_menu: ResMut<NextState<Menu>>) {
    next_menu.set(Menu::None);
}

fn unpause(mut next_pause: ResMut<NextState<Pause>>) {
    next_pause.set(Pause(false));
}

fn pause(mut next_pause: ResMut<NextState<Pause>>) {
    next_pause.set(Pause(true));
}
