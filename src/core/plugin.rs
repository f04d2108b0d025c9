//! Core plugin that sets up arena states and global events.

use bevy::prelude::*;

use super::events::*;
use super::states::*;

/// Core plugin - must be added first as other plugins depend on it.
///
/// This plugin sets up:
/// - Arena states (Loading, InGame, Victory)
/// - Global events (DamageEvent, BossReady, SoundRequest, ...)
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app
            // Initialize arena states
            .init_state::<GameState>()

            // Register global events
            .add_event::<DamageEvent>()
            .add_event::<BossReady>()
            .add_event::<BossDefeated>()
            .add_event::<BossDead>()
            .add_event::<SoundRequest>()
            .add_event::<EffectRequest>()
            .add_event::<RoomShake>()
            .add_event::<StunTarget>()

            // Nothing to stream in; go straight to the fight
            .add_systems(OnEnter(GameState::Loading), start_fight)
            .add_systems(OnEnter(GameState::Victory), announce_victory);
    }
}

fn start_fight(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::InGame);
}

fn announce_victory() {
    info!("All bosses destroyed");
}
