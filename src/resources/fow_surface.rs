use bevy::prelude::*;

use crate::resources::exploration::{EXPLORED_ALPHA, UNEXPLORED};
use crate::resources::map_data::CELL_SCALE;
use crate::utils::grid::next_pow2;

/// A 2D scalar alpha grid, one f32 per fog cell.
/// 0.0 is opaque (unexplored) fog, 1.0 fully visible terrain.
#[derive(Clone, Debug, PartialEq)]
pub struct AlphaSurface {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl AlphaSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![UNEXPLORED; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        assert!(x < self.width && y < self.height);
        self.data[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        assert!(x < self.width && y < self.height);
        self.data[(y * self.width + x) as usize] = value;
    }

    /// Raises the cell to `value` if it is currently lower; never lowers.
    pub fn raise(&mut self, x: u32, y: u32, value: f32) {
        assert!(x < self.width && y < self.height);
        let idx = (y * self.width + x) as usize;
        if self.data[idx] < value {
            self.data[idx] = value;
        }
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Row-major flat pixel view, index = y * width + x.
    pub fn pixels(&self) -> &[f32] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Deep copy from a same-sized surface.
    /// Mismatched dimensions are a programming error.
    pub fn copy_from(&mut self, other: &AlphaSurface) {
        assert!(
            self.width == other.width && self.height == other.height,
            "alpha surface dimension mismatch: {}x{} vs {}x{}",
            self.width,
            self.height,
            other.width,
            other.height
        );
        self.data.copy_from_slice(&other.data);
    }
}

/// Fog-of-war rebuild policy applied on each rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FogPolicy {
    /// Fog of war fully disabled: visibility never regresses.
    Disabled,
    /// Fog enabled: cells reset to opaque fog unless sighted this tick.
    /// Long-term exploration memory is the ExplorationGrid's job.
    Enabled,
    /// Fog enabled with the reveal-resources mode: previously seen cells
    /// settle at the explored alpha instead of going fully dark.
    RevealResources,
}

/// Deep backup of all fog surfaces, taken at scenario checkpoints.
#[derive(Clone)]
struct FowBackup {
    surfaces: [AlphaSurface; 2],
    shadow: AlphaSurface,
    front: usize,
}

/// Double-buffered fog-of-war alpha surfaces.
///
/// `current` is the state the renderer blends from, `next` the state being
/// accumulated this tick; [`FowSurfaces::rotate`] flips the buffer index
/// once per simulation tick and rebuilds `next` from policy. The shadow
/// surface mirrors monotonic raises for incremental (partial) updates.
///
/// Both buffers live in one 2-element array behind a flip index, so the
/// swap is O(1) and happens inside a single exclusive borrow; the Bevy
/// scheduler keeps writer (FixedUpdate) and reader (Update) apart.
#[derive(Resource)]
pub struct FowSurfaces {
    surfaces: [AlphaSurface; 2],
    /// Index of `current` in `surfaces`; `next` is the other slot.
    front: usize,
    shadow: AlphaSurface,
    backup: Option<FowBackup>,
}

impl FowSurfaces {
    /// Creates both buffers with the given fog-grid size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surfaces: [
                AlphaSurface::new(width, height),
                AlphaSurface::new(width, height),
            ],
            front: 0,
            shadow: AlphaSurface::new(width, height),
            backup: None,
        }
    }

    /// Sizes the fog grid for a map: map dimensions scaled down by
    /// [`CELL_SCALE`], rounded up to powers of two. Computed once; the
    /// grids never resize afterwards.
    pub fn for_map(map_width: u32, map_height: u32) -> Self {
        let w = next_pow2(map_width / CELL_SCALE);
        let h = next_pow2(map_height / CELL_SCALE);
        Self::new(w, h)
    }

    pub fn width(&self) -> u32 {
        self.surfaces[0].width()
    }

    pub fn height(&self) -> u32 {
        self.surfaces[0].height()
    }

    /// The surface the renderer blends from.
    pub fn current(&self) -> &AlphaSurface {
        &self.surfaces[self.front]
    }

    /// The surface accumulating this tick's visibility.
    pub fn next(&self) -> &AlphaSurface {
        &self.surfaces[1 - self.front]
    }

    pub fn next_mut(&mut self) -> &mut AlphaSurface {
        &mut self.surfaces[1 - self.front]
    }

    /// Flips current/next, then rebuilds the new `next` as the baseline the
    /// tick's sight marks will raise:
    ///
    /// - [`FogPolicy::Disabled`]: `max(current, prior next)` - once fog is
    ///   off, no cell ever regresses toward opaque.
    /// - [`FogPolicy::RevealResources`]: seen cells settle at the explored
    ///   alpha (capped, never below once seen); actively sighted cells are
    ///   re-raised to full by the marks that follow.
    /// - [`FogPolicy::Enabled`]: opaque fog unless sighted this tick.
    ///
    /// O(width x height), once per simulation tick - never per frame.
    pub fn rotate(&mut self, policy: FogPolicy) {
        self.front = 1 - self.front;

        let (cur_idx, next_idx) = (self.front, 1 - self.front);
        for i in 0..self.surfaces[0].data.len() {
            let cur = self.surfaces[cur_idx].data[i];
            let prior = self.surfaces[next_idx].data[i];
            self.surfaces[next_idx].data[i] = match policy {
                FogPolicy::Disabled => cur.max(prior),
                FogPolicy::RevealResources => cur.max(prior).min(EXPLORED_ALPHA),
                FogPolicy::Enabled => UNEXPLORED,
            };
        }
    }

    /// Pre-reveals the map interior at the explored alpha: the starting
    /// state for the reveal-resources mode, applied once at world init
    /// before any sight marking. The outermost ring of map cells and the
    /// power-of-two padding stay unexplored.
    ///
    /// `map_cells_w`/`map_cells_h` are the map's extent in fog cells,
    /// which may be smaller than the padded grid.
    pub fn pre_reveal(&mut self, map_cells_w: u32, map_cells_h: u32) {
        let w = map_cells_w.min(self.width());
        let h = map_cells_h.min(self.height());
        for y in 1..h.saturating_sub(1) {
            for x in 1..w.saturating_sub(1) {
                self.surfaces[0].raise(x, y, EXPLORED_ALPHA);
                self.surfaces[1].raise(x, y, EXPLORED_ALPHA);
            }
        }
    }

    /// Monotonically raises the accumulating surface at `cell`; when
    /// `incremental`, the shadow surface is raised too so partial updates
    /// can be diffed against it later.
    ///
    /// `cell` must be inside the fog grid; the sight systems clamp before
    /// calling.
    pub fn increment_alpha(&mut self, cell: IVec2, value: f32, incremental: bool) {
        assert!(
            cell.x >= 0
                && cell.y >= 0
                && (cell.x as u32) < self.width()
                && (cell.y as u32) < self.height(),
            "fog cell {cell} outside {}x{} grid",
            self.width(),
            self.height()
        );
        let (x, y) = (cell.x as u32, cell.y as u32);
        self.next_mut().raise(x, y, value);
        if incremental {
            self.shadow.raise(x, y, value);
        }
    }

    /// Deep-copies both buffers and the shadow into the backup slot.
    /// Explicit checkpoints only; nothing triggers this automatically.
    pub fn copy_to_backup(&mut self) {
        self.backup = Some(FowBackup {
            surfaces: self.surfaces.clone(),
            shadow: self.shadow.clone(),
            front: self.front,
        });
    }

    /// Restores both buffers, the shadow, and the flip index from the last
    /// backup, if any.
    pub fn restore_from_backup(&mut self) {
        if let Some(backup) = &self.backup {
            self.surfaces[0].copy_from(&backup.surfaces[0]);
            self.surfaces[1].copy_from(&backup.surfaces[1]);
            self.shadow.copy_from(&backup.shadow);
            self.front = backup.front;
        }
    }

    /// Clears all fog state back to unexplored. Used on new game.
    pub fn reset(&mut self) {
        self.surfaces[0].fill(UNEXPLORED);
        self.surfaces[1].fill(UNEXPLORED);
        self.shadow.fill(UNEXPLORED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_map_power_of_two_sizing() {
        let fow = FowSurfaces::for_map(100, 60);
        // 100/2 = 50 -> 64, 60/2 = 30 -> 32
        assert_eq!(fow.width(), 64);
        assert_eq!(fow.height(), 32);
        assert_eq!(fow.current().len(), fow.next().len());
    }

    #[test]
    fn test_rotate_swaps_buffers() {
        let mut fow = FowSurfaces::new(8, 8);
        fow.increment_alpha(IVec2::new(2, 3), 1.0, false);
        assert_eq!(fow.current().get(2, 3), 0.0);

        fow.rotate(FogPolicy::Enabled);
        // The accumulated value is now on the current side.
        assert_eq!(fow.current().get(2, 3), 1.0);
        // The new next was reset to opaque fog.
        assert_eq!(fow.next().get(2, 3), 0.0);
    }

    #[test]
    fn test_disabled_policy_never_regresses() {
        let mut fow = FowSurfaces::new(8, 8);
        fow.increment_alpha(IVec2::new(1, 1), 0.8, false);

        // Two consecutive rotations with no new marks.
        fow.rotate(FogPolicy::Disabled);
        fow.rotate(FogPolicy::Disabled);
        assert!(fow.current().get(1, 1) >= 0.8);
        assert!(fow.next().get(1, 1) >= 0.8);
    }

    #[test]
    fn test_reveal_resources_caps_at_explored_alpha() {
        let mut fow = FowSurfaces::new(8, 8);
        fow.increment_alpha(IVec2::new(4, 4), 1.0, false);
        fow.rotate(FogPolicy::RevealResources);

        // Previously seen, not re-marked: settles at the explored alpha.
        assert_eq!(fow.next().get(4, 4), EXPLORED_ALPHA);
        // Re-marked cells go fully visible again.
        fow.increment_alpha(IVec2::new(4, 4), 1.0, false);
        assert_eq!(fow.next().get(4, 4), 1.0);

        // Never-seen cells stay unexplored rather than being raised.
        assert_eq!(fow.next().get(0, 0), UNEXPLORED);
    }

    #[test]
    fn test_reveal_resources_never_drops_below_explored_once_seen() {
        let mut fow = FowSurfaces::new(8, 8);
        fow.increment_alpha(IVec2::new(4, 4), 1.0, false);
        for _ in 0..3 {
            fow.rotate(FogPolicy::RevealResources);
            assert!(fow.next().get(4, 4) >= EXPLORED_ALPHA);
        }
    }

    #[test]
    fn test_pre_reveal_fills_map_interior_at_explored_alpha() {
        let mut fow = FowSurfaces::new(8, 8);
        fow.pre_reveal(6, 6);

        assert_eq!(fow.current().get(1, 1), EXPLORED_ALPHA);
        assert_eq!(fow.next().get(4, 4), EXPLORED_ALPHA);
        // Outer map ring and power-of-two padding stay unexplored.
        assert_eq!(fow.current().get(0, 0), UNEXPLORED);
        assert_eq!(fow.current().get(5, 5), UNEXPLORED);
        assert_eq!(fow.current().get(7, 7), UNEXPLORED);
    }

    #[test]
    fn test_pre_reveal_survives_reveal_rotation() {
        let mut fow = FowSurfaces::new(8, 8);
        fow.pre_reveal(8, 8);
        fow.rotate(FogPolicy::RevealResources);
        assert_eq!(fow.next().get(3, 3), EXPLORED_ALPHA);
        fow.rotate(FogPolicy::RevealResources);
        assert_eq!(fow.next().get(3, 3), EXPLORED_ALPHA);
    }

    #[test]
    fn test_increment_alpha_is_monotonic() {
        let mut fow = FowSurfaces::new(8, 8);
        fow.increment_alpha(IVec2::new(5, 5), 0.9, false);
        fow.increment_alpha(IVec2::new(5, 5), 0.4, false);
        assert_eq!(fow.next().get(5, 5), 0.9);
    }

    #[test]
    fn test_incremental_flag_updates_shadow() {
        let mut fow = FowSurfaces::new(8, 8);
        fow.increment_alpha(IVec2::new(1, 2), 0.7, true);
        fow.increment_alpha(IVec2::new(3, 2), 0.7, false);
        assert_eq!(fow.shadow.get(1, 2), 0.7);
        assert_eq!(fow.shadow.get(3, 2), 0.0);
    }

    #[test]
    fn test_backup_restore_is_bit_identical() {
        let mut fow = FowSurfaces::new(8, 8);
        fow.increment_alpha(IVec2::new(1, 1), 0.75, true);
        fow.rotate(FogPolicy::Disabled);
        fow.increment_alpha(IVec2::new(2, 2), 0.25, false);

        let before_current = fow.current().clone();
        let before_next = fow.next().clone();
        let before_shadow = fow.shadow.clone();

        fow.copy_to_backup();
        // Scribble over everything, then roll back.
        fow.next_mut().fill(0.123);
        fow.rotate(FogPolicy::Enabled);
        fow.restore_from_backup();

        assert_eq!(*fow.current(), before_current);
        assert_eq!(*fow.next(), before_next);
        assert_eq!(fow.shadow, before_shadow);
    }

    #[test]
    fn test_restore_without_backup_is_noop() {
        let mut fow = FowSurfaces::new(4, 4);
        fow.increment_alpha(IVec2::new(0, 0), 0.5, false);
        fow.restore_from_backup();
        assert_eq!(fow.next().get(0, 0), 0.5);
    }

    #[test]
    #[should_panic]
    fn test_increment_out_of_bounds_panics() {
        let mut fow = FowSurfaces::new(4, 4);
        fow.increment_alpha(IVec2::new(4, 0), 1.0, false);
    }
}
