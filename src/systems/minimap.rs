use bevy::prelude::*;

use crate::events::MapLoadedEvent;
use crate::resources::map_data::{CELL_SCALE, MAX_HEIGHT};
use crate::resources::tileset::NEUTRAL_SURFACE_COLOR;
use crate::resources::{MapData, SurfaceType, Tileset};

/// Background color for texture padding outside the map proper.
const PADDING_COLOR: Vec4 = Vec4::new(1.0, 1.0, 1.0, 0.1);

/// Resource holding the minimap texture pair: the terrain base layer and
/// the fog overlay drawn on top of it. Both are power-of-two sized and
/// share the fog grid's dimensions.
#[derive(Resource)]
pub struct MinimapTextures {
    pub base: Handle<Image>,
    pub fog: Handle<Image>,
    pub width: u32,
    pub height: u32,
}

/// Computes the minimap base layer as RGBA8 pixels.
///
/// Each minimap pixel maps to one fog cell, sampled at its top-left
/// surface cell. Cells holding a map object use the object's fixed color;
/// plain terrain samples the tileset pixmap center, scaled by normalized
/// height, tinted blue at or below the water level, and channel-clamped.
/// A missing surface pixmap degrades to a neutral color instead of
/// failing the recompute.
pub fn compute_minimap_pixels(
    map_data: &MapData,
    tileset: &Tileset,
    tex_width: u32,
    tex_height: u32,
) -> Vec<u8> {
    let mut pixels = vec![0u8; (tex_width * tex_height * 4) as usize];
    let mut missing = [false; SurfaceType::ALL.len()];

    for j in 0..tex_height {
        for i in 0..tex_width {
            let sx = i * CELL_SCALE;
            let sy = j * CELL_SCALE;
            let color = match map_data.cell(sx, sy) {
                None => PADDING_COLOR,
                Some(cell) => match cell.object {
                    Some(object) => object.color().extend(1.0),
                    None => {
                        let base = match tileset.surf_pixmap(cell.surface) {
                            Some(pixmap) => pixmap.center_pixel(),
                            None => {
                                let idx = cell.surface.texture_index() as usize;
                                if !missing[idx] {
                                    missing[idx] = true;
                                    warn!(
                                        "no tileset pixmap for {:?}; using neutral color",
                                        cell.surface
                                    );
                                }
                                NEUTRAL_SURFACE_COLOR
                            }
                        };
                        let factor = cell.height / MAX_HEIGHT;
                        let mut color =
                            (base.truncate() * factor).extend(1.0);
                        if cell.height <= map_data.water_level {
                            color += Vec4::new(0.5, 0.5, 1.0, 1.0);
                        }
                        color.clamp(Vec4::ZERO, Vec4::ONE)
                    }
                },
            };

            let idx = ((j * tex_width + i) * 4) as usize;
            pixels[idx] = (color.x * 255.0).round() as u8;
            pixels[idx + 1] = (color.y * 255.0).round() as u8;
            pixels[idx + 2] = (color.z * 255.0).round() as u8;
            pixels[idx + 3] = (color.w * 255.0).round() as u8;
        }
    }

    pixels
}

/// System that recomputes the minimap base layer when a map loads.
/// Full O(width x height) pass; never runs per frame.
pub fn minimap_recompute_system(
    mut events: EventReader<MapLoadedEvent>,
    map_data: Res<MapData>,
    tileset: Res<Tileset>,
    minimap: Option<Res<MinimapTextures>>,
    mut images: ResMut<Assets<Image>>,
) {
    if events.read().count() == 0 {
        return;
    }
    let Some(minimap) = minimap else {
        return;
    };
    let Some(image) = images.get_mut(&minimap.base) else {
        return;
    };

    image.data = compute_minimap_pixels(&map_data, &tileset, minimap.width, minimap.height);
    info!(
        "Minimap base layer recomputed: {}x{} pixels",
        minimap.width, minimap.height
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ObjectClass;

    fn pixel(pixels: &[u8], x: u32, y: u32, width: u32) -> [u8; 4] {
        let idx = ((y * width + x) * 4) as usize;
        [pixels[idx], pixels[idx + 1], pixels[idx + 2], pixels[idx + 3]]
    }

    #[test]
    fn test_underwater_cell_has_blue_bias() {
        let mut map = MapData::new(8, 8);
        map.water_level = 2.0;
        map.cell_mut(0, 0).unwrap().height = 1.0;
        let tileset = Tileset::procedural();

        let pixels = compute_minimap_pixels(&map, &tileset, 4, 4);
        let [r, g, b, _] = pixel(&pixels, 0, 0, 4);
        assert!(b >= r && b >= g, "expected blue bias, got ({r}, {g}, {b})");
    }

    #[test]
    fn test_object_cell_uses_object_color() {
        let mut map = MapData::new(8, 8);
        map.cell_mut(0, 0).unwrap().object = Some(ObjectClass::Tree);
        let tileset = Tileset::procedural();

        let pixels = compute_minimap_pixels(&map, &tileset, 4, 4);
        let expected = ObjectClass::Tree.color();
        let [r, g, b, a] = pixel(&pixels, 0, 0, 4);
        assert_eq!(r, (expected.x * 255.0).round() as u8);
        assert_eq!(g, (expected.y * 255.0).round() as u8);
        assert_eq!(b, (expected.z * 255.0).round() as u8);
        assert_eq!(a, 255);
    }

    #[test]
    fn test_missing_pixmap_degrades_to_neutral() {
        let mut map = MapData::new(8, 8);
        map.water_level = 0.0;
        map.cell_mut(0, 0).unwrap().height = MAX_HEIGHT;
        let tileset = Tileset::empty();

        let pixels = compute_minimap_pixels(&map, &tileset, 4, 4);
        let [r, g, b, _] = pixel(&pixels, 0, 0, 4);
        // Neutral gray at full height: 0.5 on every channel.
        assert_eq!((r, g, b), (128, 128, 128));
    }

    #[test]
    fn test_padding_outside_map() {
        let map = MapData::new(4, 4); // 2x2 fog cells inside an 4x4 texture
        let tileset = Tileset::procedural();
        let pixels = compute_minimap_pixels(&map, &tileset, 4, 4);
        let [_, _, _, a] = pixel(&pixels, 3, 3, 4);
        assert_eq!(a, (0.1f32 * 255.0).round() as u8);
    }
}
