use bevy::prelude::*;
use rand::Rng;

use crate::components::{MoveTarget, Unit};
use crate::resources::MapData;
use crate::utils::grid::surface_to_world;

/// Moves units toward their current target and picks a fresh random
/// in-map destination on arrival. Keeps the fog demo alive without a
/// real order queue.
pub fn wander_system(
    time: Res<Time>,
    map_data: Res<MapData>,
    mut units: Query<(&mut Transform, &mut MoveTarget), With<Unit>>,
) {
    let mut rng = rand::thread_rng();
    for (mut transform, mut target) in units.iter_mut() {
        let pos = transform.translation.truncate();
        let to_target = target.target - pos;
        let step = target.speed * time.delta_secs();

        if to_target.length() <= step {
            transform.translation.x = target.target.x;
            transform.translation.y = target.target.y;
            let sx = rng.gen_range(0..map_data.width) as i32;
            let sy = rng.gen_range(0..map_data.height) as i32;
            target.target =
                surface_to_world(IVec2::new(sx, sy), map_data.width, map_data.height);
        } else {
            let delta = to_target.normalize() * step;
            transform.translation.x += delta.x;
            transform.translation.y += delta.y;
        }
    }
}
