use bevy::prelude::*;

use crate::components::{Team, Unit, Vision};
use crate::resources::{ExplorationGrid, FowSurfaces, GameSettings, MapData, WorldClock};
use crate::utils::grid::{surface_to_fow, world_to_surface};

/// Clears every team's current-tick visibility before units contribute
/// sight. The persistent explored state is untouched.
pub fn begin_tick_system(mut exploration: ResMut<ExplorationGrid>) {
    exploration.begin_tick();
}

/// System that accumulates unit sight into the `ExplorationGrid` and
/// pushes the viewing team's visibility into the fog surfaces.
///
/// Runs after the per-tick rotate, so the marks raise the freshly rebuilt
/// accumulating surface. A unit positioned off the map is logged and
/// skipped; it never aborts the tick.
pub fn sight_marking_system(
    mut exploration: ResMut<ExplorationGrid>,
    mut surfaces: ResMut<FowSurfaces>,
    settings: Res<GameSettings>,
    clock: Res<WorldClock>,
    map_data: Res<MapData>,
    units: Query<(&Transform, &Vision, &Team), With<Unit>>,
) {
    let tick = clock.tick();

    for (transform, vision, team) in &units {
        let pos = transform.translation.truncate();
        let surface = world_to_surface(pos, map_data.width, map_data.height);
        if !map_data.in_bounds(surface.x, surface.y) {
            warn!(
                "unit at ({:.1}, {:.1}) is off the map; sight contribution skipped",
                pos.x, pos.y
            );
            continue;
        }

        let cell = surface_to_fow(surface);
        exploration.mark_visible(team.0, cell, vision.sight_range, tick);
    }

    // Only the viewing team's visibility drives the overlay texture.
    exploration.for_each_visible(settings.this_team, |cell, alpha| {
        surfaces.increment_alpha(cell, alpha, true);
    });
}

/// Drops sight-cache entries past the staleness bound so non-moving units
/// cannot grow the cache without limit.
pub fn prune_sight_cache_system(
    mut exploration: ResMut<ExplorationGrid>,
    clock: Res<WorldClock>,
) {
    exploration.prune_cache(clock.tick());
}
