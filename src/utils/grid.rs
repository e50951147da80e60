use bevy::prelude::*;

use crate::resources::map_data::CELL_SCALE;

/// Side length of one terrain surface cell in world units.
pub const TILE_SIZE: f32 = 32.0;

/// Rounds `n` up to the next power of two (minimum 1).
/// Fog and minimap textures are sized this way so they upload as
/// power-of-two textures regardless of the map dimensions.
pub fn next_pow2(n: u32) -> u32 {
    let mut p = 1;
    while p < n {
        p *= 2;
    }
    p
}

/// Converts a surface cell coordinate to the world position of its center.
/// World (0, 0) is the map center.
pub fn surface_to_world(cell: IVec2, map_width: u32, map_height: u32) -> Vec2 {
    let x = (cell.x as f32 - map_width as f32 / 2.0) * TILE_SIZE + TILE_SIZE / 2.0;
    let y = (cell.y as f32 - map_height as f32 / 2.0) * TILE_SIZE + TILE_SIZE / 2.0;
    Vec2::new(x, y)
}

/// Converts a world position to surface cell coordinates.
/// The result may be out of bounds; callers clamp or reject.
pub fn world_to_surface(pos: Vec2, map_width: u32, map_height: u32) -> IVec2 {
    let x = (pos.x / TILE_SIZE + map_width as f32 / 2.0).floor() as i32;
    let y = (pos.y / TILE_SIZE + map_height as f32 / 2.0).floor() as i32;
    IVec2::new(x, y)
}

/// Converts a surface cell coordinate to the coarser fog-grid coordinate.
pub fn surface_to_fow(cell: IVec2) -> IVec2 {
    IVec2::new(cell.x / CELL_SCALE as i32, cell.y / CELL_SCALE as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_pow2() {
        assert_eq!(next_pow2(1), 1);
        assert_eq!(next_pow2(2), 2);
        assert_eq!(next_pow2(3), 4);
        assert_eq!(next_pow2(64), 64);
        assert_eq!(next_pow2(65), 128);
        assert_eq!(next_pow2(0), 1);
    }

    #[test]
    fn test_world_surface_round_trip() {
        let cell = IVec2::new(10, 20);
        let world = surface_to_world(cell, 64, 64);
        assert_eq!(world_to_surface(world, 64, 64), cell);
    }

    #[test]
    fn test_surface_to_fow_scale() {
        assert_eq!(surface_to_fow(IVec2::new(5, 9)), IVec2::new(2, 4));
        assert_eq!(surface_to_fow(IVec2::new(0, 0)), IVec2::new(0, 0));
    }
}
