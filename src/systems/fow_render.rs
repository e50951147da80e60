use bevy::prelude::*;

use crate::resources::fow_surface::{AlphaSurface, FowSurfaces};

/// Resource interpolating the fog overlay between the two buffered
/// surfaces and uploading the result to the overlay texture.
///
/// Holds the last value written per cell, so a frame only touches cells
/// whose target (`next`) value differs from what is already on screen -
/// O(changed cells) rather than O(grid size) once the fog settles.
#[derive(Resource)]
pub struct FowTextureBlender {
    last_rendered: AlphaSurface,
    texture: Handle<Image>,
}

impl FowTextureBlender {
    pub fn new(width: u32, height: u32, texture: Handle<Image>) -> Self {
        Self {
            last_rendered: AlphaSurface::new(width, height),
            texture,
        }
    }

    /// The overlay texture handle; read-only for the renderer.
    pub fn texture(&self) -> &Handle<Image> {
        &self.texture
    }

    /// The rendered fog state, as last written.
    pub fn rendered(&self) -> &AlphaSurface {
        &self.last_rendered
    }

    /// Interpolates toward `next` by the intra-tick fraction `t` and
    /// returns the (flat index, value) pairs that changed this frame.
    ///
    /// `t` must already be clamped to [0, 1] by the caller; out-of-range
    /// values produce an undefined visual result, not a crash.
    pub fn blend(
        &mut self,
        current: &AlphaSurface,
        next: &AlphaSurface,
        t: f32,
    ) -> Vec<(usize, f32)> {
        let mut dirty = Vec::new();
        let last = self.last_rendered.pixels_mut();
        let cur = current.pixels();
        let nxt = next.pixels();
        for i in 0..last.len() {
            if nxt[i] != last[i] {
                let value = cur[i] + t * (nxt[i] - cur[i]);
                last[i] = value;
                dirty.push((i, value));
            }
        }
        dirty
    }
}

/// System that blends the fog overlay every render frame.
///
/// `t` is the fixed-timestep overstep fraction: 0 right after a tick,
/// approaching 1 just before the next, so the overlay eases from the
/// previous fog state to the accumulating one across the tick.
pub fn fow_blend_system(
    mut blender: ResMut<FowTextureBlender>,
    surfaces: Res<FowSurfaces>,
    time: Res<Time<Fixed>>,
    mut images: ResMut<Assets<Image>>,
) {
    let t = time.overstep_fraction().clamp(0.0, 1.0);
    let dirty = blender.blend(surfaces.current(), surfaces.next(), t);
    if dirty.is_empty() {
        return;
    }

    let handle = blender.texture().clone();
    let Some(image) = images.get_mut(&handle) else {
        return;
    };
    for (idx, value) in dirty {
        // The overlay is black; the alpha channel hides what the team
        // cannot see (visibility 1.0 -> alpha 0).
        let byte = ((1.0 - value).clamp(0.0, 1.0) * 255.0).round() as u8;
        let base = idx * 4;
        if base + 4 <= image.data.len() {
            image.data[base + 3] = byte;
        }
    }
}
