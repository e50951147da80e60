use bevy::prelude::*;

use crate::resources::WorldClock;

/// System that advances the world clock on every FixedUpdate tick.
///
/// Runs ahead of the fog systems so sight caching and staleness pruning
/// see the tick being simulated.
pub fn world_tick_system(mut world_clock: ResMut<WorldClock>) {
    world_clock.advance();
}
