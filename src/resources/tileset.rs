use bevy::prelude::*;

use crate::resources::map_data::SurfaceType;

/// Fallback used when a surface type has no pixmap loaded.
/// The minimap degrades to this neutral gray instead of failing.
pub const NEUTRAL_SURFACE_COLOR: Vec4 = Vec4::new(0.5, 0.5, 0.5, 1.0);

/// A small CPU-side RGBA image, components in 0..=1.
/// Used for tileset surface art that the minimap projector samples.
#[derive(Clone, Debug)]
pub struct Pixmap {
    width: u32,
    height: u32,
    pixels: Vec<Vec4>,
}

impl Pixmap {
    /// Creates a pixmap filled with a single color.
    pub fn filled(width: u32, height: u32, color: Vec4) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel accessor; coordinates must be in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Vec4 {
        assert!(x < self.width && y < self.height);
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Vec4) {
        assert!(x < self.width && y < self.height);
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Samples the pixel at the pixmap center. The minimap projector uses
    /// this as the representative color for a surface type.
    pub fn center_pixel(&self) -> Vec4 {
        self.pixel(self.width / 2, self.height / 2)
    }
}

/// Resource holding the per-surface tileset art.
///
/// Surface pixmaps are generated procedurally (flat base color with subtle
/// per-pixel variation) rather than loaded from image files; slots may be
/// empty, which the minimap treats as a missing-asset condition and
/// renders with [`NEUTRAL_SURFACE_COLOR`].
#[derive(Resource)]
pub struct Tileset {
    surf_pixmaps: [Option<Pixmap>; SurfaceType::ALL.len()],
}

impl Tileset {
    const PIXMAP_SIZE: u32 = 16;

    /// Base colors per surface type (RGB, 0..=1), in tileset index order.
    const BASE_COLORS: [Vec3; 5] = [
        Vec3::new(0.25, 0.55, 0.2),  // Grass - green
        Vec3::new(0.55, 0.55, 0.25), // ScrubGrass - dry yellow-green
        Vec3::new(0.5, 0.4, 0.3),    // Ground - brown
        Vec3::new(0.55, 0.55, 0.6),  // Stone - gray
        Vec3::new(0.35, 0.4, 0.3),   // Riverbed - dark silt
    ];

    /// Builds the full procedural tileset.
    pub fn procedural() -> Self {
        let mut surf_pixmaps: [Option<Pixmap>; SurfaceType::ALL.len()] = Default::default();
        for surface in SurfaceType::ALL {
            let idx = surface.texture_index() as usize;
            surf_pixmaps[idx] = Some(Self::surface_pixmap(Self::BASE_COLORS[idx]));
        }
        Self { surf_pixmaps }
    }

    /// An empty tileset with no pixmaps at all; the minimap falls back to
    /// neutral colors for every surface.
    pub fn empty() -> Self {
        Self {
            surf_pixmaps: Default::default(),
        }
    }

    /// Returns the pixmap for a surface type, if present.
    pub fn surf_pixmap(&self, surface: SurfaceType) -> Option<&Pixmap> {
        self.surf_pixmaps[surface.texture_index() as usize].as_ref()
    }

    fn surface_pixmap(base: Vec3) -> Pixmap {
        let size = Self::PIXMAP_SIZE;
        let mut pixmap = Pixmap::filled(size, size, base.extend(1.0));
        // Subtle deterministic variation for visual interest; the exact
        // center pixel keeps the base color so minimap sampling is stable.
        for y in 0..size {
            for x in 0..size {
                if x == size / 2 && y == size / 2 {
                    continue;
                }
                let variation = ((x + y) % 8) as f32 / 255.0 - 4.0 / 255.0;
                let c = (base + Vec3::splat(variation)).clamp(Vec3::ZERO, Vec3::ONE);
                pixmap.set_pixel(x, y, c.extend(1.0));
            }
        }
        pixmap
    }
}

impl Default for Tileset {
    fn default() -> Self {
        Self::procedural()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procedural_tileset_has_all_surfaces() {
        let tileset = Tileset::procedural();
        for surface in SurfaceType::ALL {
            assert!(tileset.surf_pixmap(surface).is_some());
        }
    }

    #[test]
    fn test_center_pixel_is_base_color() {
        let tileset = Tileset::procedural();
        let pixmap = tileset.surf_pixmap(SurfaceType::Grass).unwrap();
        assert_eq!(pixmap.center_pixel(), Vec3::new(0.25, 0.55, 0.2).extend(1.0));
    }

    #[test]
    fn test_empty_tileset_has_no_pixmaps() {
        let tileset = Tileset::empty();
        assert!(tileset.surf_pixmap(SurfaceType::Stone).is_none());
    }
}
