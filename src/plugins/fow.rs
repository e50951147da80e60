use bevy::prelude::*;

use crate::events::{FogSettingChangedEvent, FowCheckpointEvent};
use crate::plugins::core::GameState;
use crate::systems::{
    begin_tick_system, fog_setting_event_system, fow_blend_system, fow_checkpoint_system,
    fow_rotate_system, prune_sight_cache_system, sight_marking_system, world_tick_system,
};

/// Plugin wiring the fog-of-war pipeline.
///
/// The simulation half runs on the fixed tick: rotate the surface pair,
/// reset per-tick visibility, mark unit sight, prune the stale sight
/// cache. The render half runs per frame and only interpolates between
/// the two surfaces; it never writes simulation state.
pub struct FogOfWarPlugin;

impl Plugin for FogOfWarPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<FogSettingChangedEvent>()
            .add_event::<FowCheckpointEvent>()
            .add_systems(
                FixedUpdate,
                (
                    fow_rotate_system.after(world_tick_system),
                    begin_tick_system.after(fow_rotate_system),
                    sight_marking_system.after(begin_tick_system),
                    prune_sight_cache_system.after(sight_marking_system),
                )
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (
                    fow_blend_system,
                    fog_setting_event_system,
                    fow_checkpoint_system,
                )
                    .run_if(in_state(GameState::Playing)),
            );
    }
}
