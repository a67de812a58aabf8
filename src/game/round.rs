//! Round state machine - countdown timer, score, spawn cadence.
//!
//! A round runs for a fixed 60 seconds. The countdown ticks at 1 Hz, bubble
//! spawning at 2 Hz; both are gated on the `Running` phase so nothing keeps
//! mutating state once the round is over.

use bevy::prelude::*;

use super::{
    bubble::Bubble,
    laser::{BubblesPopped, LaserVisual},
    popup::ScorePopup,
};
use crate::{AppSystems, PausableSystems, menus::Menu, screens::Screen, theme::GameFont};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<Round>();
    app.register_type::<Round>();
    app.register_type::<RoundPhase>();

    app.add_message::<StartRound>();
    app.add_message::<RoundOver>();

    app.add_systems(OnEnter(Screen::Gameplay), (begin_round, spawn_hud));

    app.add_systems(
        Update,
        (
            tick_countdown
                .in_set(AppSystems::TickTimers)
                .in_set(PausableSystems)
                .run_if(round_running),
            (apply_score, update_hud)
                .in_set(AppSystems::Update)
                .in_set(PausableSystems),
            // Restart and game-over handling must keep running while a menu
            // is open (the game-over menu pauses gameplay).
            (start_round, handle_round_over).in_set(AppSystems::Update),
        )
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// Duration of one round in seconds.
pub const ROUND_SECONDS: u32 = 60;

/// Seconds between bubble spawns while the round is running.
const SPAWN_INTERVAL_SECS: f32 = 0.5;

/// Message requesting a fresh round. Restart is the same path as the initial
/// start; every module owning round-scoped state listens for this.
#[derive(Message, Debug, Clone)]
pub struct StartRound;

/// Message sent the instant the countdown reaches zero.
#[derive(Message, Debug, Clone)]
pub struct RoundOver;

/// The phase of the round state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum RoundPhase {
    /// No round has been started yet.
    #[default]
    Ready,
    /// The countdown is live and bubbles are spawning.
    Running,
    /// The countdown hit zero; terminal until an explicit restart.
    Over,
}

/// Resource tracking the current round.
#[derive(Resource, Debug, Reflect)]
#[reflect(Resource)]
pub struct Round {
    pub phase: RoundPhase,
    pub score: u32,
    pub time_remaining: u32,
    countdown: Timer,
    pub spawn_timer: Timer,
    next_bubble_id: u64,
}

impl Default for Round {
    fn default() -> Self {
        Self {
            phase: RoundPhase::Ready,
            score: 0,
            time_remaining: ROUND_SECONDS,
            countdown: Timer::from_seconds(1.0, TimerMode::Repeating),
            spawn_timer: Timer::from_seconds(SPAWN_INTERVAL_SECS, TimerMode::Repeating),
            next_bubble_id: 1,
        }
    }
}

impl Round {
    /// Begin a fresh round. No state carries over from the previous one.
    pub fn start(&mut self) {
        self.phase = RoundPhase::Running;
        self.score = 0;
        self.time_remaining = ROUND_SECONDS;
        self.countdown.reset();
        self.spawn_timer.reset();
        self.next_bubble_id = 1;
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    /// Hand out the next bubble id. Ids strictly increase within a round.
    pub fn allocate_bubble_id(&mut self) -> u64 {
        let id = self.next_bubble_id;
        self.next_bubble_id += 1;
        id
    }

    /// Award points for one hit set, +1 per bubble. The score is the total
    /// count of bubbles ever hit this round, independent of set order.
    pub fn apply_hits(&mut self, count: u32) {
        self.score += count;
    }

    /// Advance the countdown by one second. Returns true if this tick ended
    /// the round.
    fn tick_second(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }

        self.time_remaining -= 1;
        if self.time_remaining == 0 {
            self.phase = RoundPhase::Over;
            info!("Round over! Final score: {}", self.score);
            return true;
        }
        false
    }
}

/// Run condition: the round is in its `Running` phase.
pub fn round_running(round: Res<Round>) -> bool {
    round.is_running()
}

/// Start a round when entering gameplay.
fn begin_round(mut round: ResMut<Round>) {
    round.start();
    info!("Round started: {}s on the clock", ROUND_SECONDS);
}

/// Restart on request (e.g. "Play Again" from the game-over menu).
fn start_round(
    mut commands: Commands,
    mut start_events: MessageReader<StartRound>,
    mut round: ResMut<Round>,
    mut next_menu: ResMut<NextState<Menu>>,
    bubble_query: Query<Entity, With<Bubble>>,
    laser_query: Query<Entity, With<LaserVisual>>,
    popup_query: Query<Entity, With<ScorePopup>>,
) {
    if start_events.read().next().is_none() {
        return;
    }

    round.start();
    for entity in bubble_query
        .iter()
        .chain(laser_query.iter())
        .chain(popup_query.iter())
    {
        commands.entity(entity).despawn();
    }
    next_menu.set(Menu::None);
    info!("Round restarted");
}

/// Tick the 1 Hz countdown while running.
fn tick_countdown(
    time: Res<Time>,
    mut round: ResMut<Round>,
    mut over_events: MessageWriter<RoundOver>,
) {
    round.countdown.tick(time.delta());
    for _ in 0..round.countdown.times_finished_this_tick() {
        if round.tick_second() {
            over_events.write(RoundOver);
            break;
        }
    }
}

/// Clear the playfield and show the game-over menu when the round ends.
/// In-flight pop animations are discarded, not animated out.
fn handle_round_over(
    mut commands: Commands,
    mut over_events: MessageReader<RoundOver>,
    mut next_menu: ResMut<NextState<Menu>>,
    bubble_query: Query<Entity, With<Bubble>>,
    laser_query: Query<Entity, With<LaserVisual>>,
    popup_query: Query<Entity, With<ScorePopup>>,
) {
    if over_events.read().next().is_none() {
        return;
    }

    for entity in bubble_query
        .iter()
        .chain(laser_query.iter())
        .chain(popup_query.iter())
    {
        commands.entity(entity).despawn();
    }
    next_menu.set(Menu::GameOver);
}

/// Award one point per bubble in a hit set.
fn apply_score(mut round: ResMut<Round>, mut popped_events: MessageReader<BubblesPopped>) {
    for event in popped_events.read() {
        round.apply_hits(event.hits.len() as u32);
        info!(
            "+{} point(s), total {}",
            event.hits.len(),
            round.score
        );
    }
}

/// Marker for the HUD score text.
#[derive(Component)]
struct ScoreLabel;

/// Marker for the HUD time text.
#[derive(Component)]
struct TimeLabel;

/// Spawn the score/time row at the top of the screen.
fn spawn_hud(mut commands: Commands, game_font: Res<GameFont>) {
    let font = game_font.0.clone();

    commands.spawn((
        Name::new("HUD"),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(20.0),
            left: Val::Px(20.0),
            right: Val::Px(20.0),
            flex_direction: FlexDirection::Row,
            justify_content: JustifyContent::SpaceBetween,
            ..default()
        },
        GlobalZIndex(1),
        Pickable::IGNORE,
        DespawnOnExit(Screen::Gameplay),
        children![
            (
                Name::new("Score Label"),
                ScoreLabel,
                Text::new("Score: 0"),
                TextFont {
                    font: font.clone(),
                    font_size: 24.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ),
            (
                Name::new("Time Label"),
                TimeLabel,
                Text::new(format!("Time: {ROUND_SECONDS}s")),
                TextFont {
                    font,
                    font_size: 24.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ),
        ],
    ));
}

/// Keep the HUD text in sync with the round resource.
fn update_hud(
    round: Res<Round>,
    mut score_query: Query<&mut Text, With<ScoreLabel>>,
    mut time_query: Query<&mut Text, (With<TimeLabel>, Without<ScoreLabel>)>,
) {
    if !round.is_changed() {
        return;
    }

    if let Ok(mut text) = score_query.single_mut() {
        text.0 = format!("Score: {}", round.score);
    }
    if let Ok(mut text) = time_query.single_mut() {
        text.0 = format!("Time: {}s", round.time_remaining);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_resets_everything() {
        let mut round = Round::default();
        round.score = 42;
        round.time_remaining = 3;
        round.phase = RoundPhase::Over;
        round.next_bubble_id = 99;

        round.start();

        assert_eq!(round.phase, RoundPhase::Running);
        assert_eq!(round.score, 0);
        assert_eq!(round.time_remaining, ROUND_SECONDS);
        assert_eq!(round.allocate_bubble_id(), 1);
    }

    #[test]
    fn test_countdown_reaches_exactly_zero_then_stops() {
        let mut round = Round::default();
        round.start();

        for i in 0..ROUND_SECONDS - 1 {
            assert!(!round.tick_second());
            assert_eq!(round.time_remaining, ROUND_SECONDS - 1 - i);
            assert!(round.is_running());
        }

        // The final tick ends the round at exactly zero.
        assert!(round.tick_second());
        assert_eq!(round.time_remaining, 0);
        assert_eq!(round.phase, RoundPhase::Over);

        // Extra ticks after the round is over mutate nothing.
        assert!(!round.tick_second());
        assert_eq!(round.time_remaining, 0);
        assert_eq!(round.phase, RoundPhase::Over);
    }

    #[test]
    fn test_bubble_ids_strictly_increase() {
        let mut round = Round::default();
        round.start();

        let mut last = 0;
        for _ in 0..100 {
            let id = round.allocate_bubble_id();
            assert!(id > last);
            last = id;
        }
    }

    #[test]
    fn test_score_accumulates_across_hit_sets() {
        let mut round = Round::default();
        round.start();

        round.apply_hits(1);
        // Two coincident bubbles popped by one beam count double.
        round.apply_hits(2);
        round.apply_hits(1);
        assert_eq!(round.score, 4);

        round.start();
        assert_eq!(round.score, 0);
    }

    #[test]
    fn test_restart_resets_id_space() {
        let mut round = Round::default();
        round.start();
        round.allocate_bubble_id();
        round.allocate_bubble_id();

        round.start();
        assert_eq!(round.allocate_bubble_id(), 1);
    }
}
