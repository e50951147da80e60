use bevy::prelude::*;
use bevy::utils::HashMap;

/// Visibility value for a cell no team member has ever seen.
pub const UNEXPLORED: f32 = 0.0;

/// Alpha level for cells that were seen before but are out of sight now.
pub const EXPLORED_ALPHA: f32 = 0.5;

/// Full visibility for cells inside a unit's sight range.
pub const FULL_VISIBILITY: f32 = 1.0;

/// Width of the graded band past a unit's sight range, in fog cells.
/// Alpha fades from full visibility down to the explored alpha across it.
pub const SIGHT_FRINGE: u32 = 2;

/// Cached sight areas unused for this many ticks are pruned, so stationary
/// units keep their entry alive while stale positions do not accumulate.
pub const SIGHT_CACHE_STALE_TICKS: u64 = 100;

/// A precomputed set of fog cells covered from one position at one sight
/// range: flat cell index plus the alpha contribution at that cell.
struct SightArea {
    cells: Vec<(usize, f32)>,
    last_used: u64,
}

/// Per-team visibility state. Never shared across teams.
struct TeamVisibility {
    /// Alpha contributed by this team's units during the current tick.
    visible: Vec<f32>,
    /// Cells any of this team's units has ever sighted.
    explored: Vec<bool>,
}

impl TeamVisibility {
    fn new(len: usize) -> Self {
        Self {
            visible: vec![UNEXPLORED; len],
            explored: vec![false; len],
        }
    }
}

/// Resource tracking which fog cells each team can currently see and has
/// ever explored.
///
/// This is used by:
/// - the sight marking system to accumulate unit vision every tick
/// - gameplay queries ("is this cell visible to team T")
/// - the fog surface push for the viewing team
#[derive(Resource)]
pub struct ExplorationGrid {
    width: u32,
    height: u32,
    teams: Vec<TeamVisibility>,
    /// Sight areas keyed by (position, sight range). Reused while a unit is
    /// stationary with an unchanged range; entries expire by staleness.
    cache: HashMap<(IVec2, u32), SightArea>,
}

impl ExplorationGrid {
    /// Creates the grid for a fixed fog-grid size and team count.
    /// Dimensions and team count are immutable afterwards.
    pub fn new(width: u32, height: u32, team_count: usize) -> Self {
        let len = (width * height) as usize;
        Self {
            width,
            height,
            teams: (0..team_count).map(|_| TeamVisibility::new(len)).collect(),
            cache: HashMap::default(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// Clears every team's current-tick visibility. Runs once per tick
    /// before units contribute sight; the ever-explored state persists.
    pub fn begin_tick(&mut self) {
        for team in &mut self.teams {
            team.visible.fill(UNEXPLORED);
        }
    }

    /// Marks all cells within `sight_range` of `pos` as visible for `team`,
    /// with a fading fringe past the range, and merges them into the team's
    /// ever-explored set.
    ///
    /// An invalid team index is logged and skipped (the unit's contribution
    /// is lost, the tick continues). Out-of-bounds cells are clamped away
    /// silently.
    pub fn mark_visible(&mut self, team: usize, pos: IVec2, sight_range: u32, tick: u64) {
        if team >= self.teams.len() {
            warn!(
                "sight contribution for invalid team {} (of {}) skipped",
                team,
                self.teams.len()
            );
            return;
        }

        let (width, height) = (self.width, self.height);
        let area = self
            .cache
            .entry((pos, sight_range))
            .or_insert_with(|| SightArea {
                cells: compute_sight_area(pos, sight_range, width, height),
                last_used: tick,
            });
        area.last_used = tick;

        let state = &mut self.teams[team];
        for &(idx, alpha) in &area.cells {
            if state.visible[idx] < alpha {
                state.visible[idx] = alpha;
            }
            state.explored[idx] = true;
        }
    }

    /// Returns the current visibility value for `team` at `cell`:
    /// the accumulated alpha if sighted this tick, [`EXPLORED_ALPHA`] if
    /// only previously explored, [`UNEXPLORED`] if never seen or out of
    /// bounds.
    ///
    /// # Panics
    /// Panics on an invalid team index; team count is fixed at world
    /// initialization, so this is a caller bug, not a runtime condition.
    pub fn query_visibility(&self, team: usize, cell: IVec2) -> f32 {
        assert!(
            team < self.teams.len(),
            "team index {} out of range (teams: {})",
            team,
            self.teams.len()
        );
        if cell.x < 0 || cell.y < 0 || cell.x >= self.width as i32 || cell.y >= self.height as i32 {
            return UNEXPLORED;
        }

        let idx = (cell.y as u32 * self.width + cell.x as u32) as usize;
        let state = &self.teams[team];
        if state.visible[idx] > UNEXPLORED {
            state.visible[idx]
        } else if state.explored[idx] {
            EXPLORED_ALPHA
        } else {
            UNEXPLORED
        }
    }

    /// Calls `f` for every cell `team` sighted this tick, with its alpha.
    /// Used to push the viewing team's visibility into the fog surfaces.
    pub fn for_each_visible(&self, team: usize, mut f: impl FnMut(IVec2, f32)) {
        assert!(team < self.teams.len());
        let state = &self.teams[team];
        for (idx, &alpha) in state.visible.iter().enumerate() {
            if alpha > UNEXPLORED {
                let cell = IVec2::new(
                    (idx as u32 % self.width) as i32,
                    (idx as u32 / self.width) as i32,
                );
                f(cell, alpha);
            }
        }
    }

    /// Drops sight-area entries unused for [`SIGHT_CACHE_STALE_TICKS`].
    pub fn prune_cache(&mut self, tick: u64) {
        self.cache
            .retain(|_, area| tick.saturating_sub(area.last_used) <= SIGHT_CACHE_STALE_TICKS);
    }

    /// Number of cached sight areas, for staleness diagnostics.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

/// Computes the bounded-distance cell set for one (position, range) pair:
/// full alpha within `sight_range` (Euclidean), fading to the explored
/// alpha across the fringe band. Out-of-bounds cells are omitted.
fn compute_sight_area(pos: IVec2, sight_range: u32, width: u32, height: u32) -> Vec<(usize, f32)> {
    let outer = (sight_range + SIGHT_FRINGE) as i32;
    let mut cells = Vec::new();
    for dy in -outer..=outer {
        for dx in -outer..=outer {
            let x = pos.x + dx;
            let y = pos.y + dy;
            if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                continue;
            }
            let dist = ((dx * dx + dy * dy) as f32).sqrt();
            let alpha = if dist <= sight_range as f32 {
                FULL_VISIBILITY
            } else if dist <= (sight_range + SIGHT_FRINGE) as f32 {
                let fade = (dist - sight_range as f32) / SIGHT_FRINGE as f32;
                FULL_VISIBILITY - fade * (FULL_VISIBILITY - EXPLORED_ALPHA)
            } else {
                continue;
            };
            cells.push(((y as u32 * width + x as u32) as usize, alpha));
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmarked_cells_are_unexplored() {
        let grid = ExplorationGrid::new(10, 10, 2);
        assert_eq!(grid.query_visibility(0, IVec2::new(3, 3)), UNEXPLORED);
        assert_eq!(grid.query_visibility(1, IVec2::new(0, 9)), UNEXPLORED);
    }

    #[test]
    fn test_mark_visible_scenario() {
        // 10x10 grid, unit at (5,5) with sight range 2 on team 0.
        let mut grid = ExplorationGrid::new(10, 10, 2);
        grid.mark_visible(0, IVec2::new(5, 5), 2, 0);

        assert_eq!(grid.query_visibility(0, IVec2::new(5, 5)), FULL_VISIBILITY);
        assert_eq!(grid.query_visibility(0, IVec2::new(9, 9)), UNEXPLORED);
        // Other teams see nothing.
        assert_eq!(grid.query_visibility(1, IVec2::new(5, 5)), UNEXPLORED);
    }

    #[test]
    fn test_explored_memory_survives_tick_clear() {
        let mut grid = ExplorationGrid::new(10, 10, 1);
        grid.mark_visible(0, IVec2::new(5, 5), 2, 0);
        grid.begin_tick();
        assert_eq!(grid.query_visibility(0, IVec2::new(5, 5)), EXPLORED_ALPHA);
    }

    #[test]
    fn test_fringe_alpha_between_explored_and_full() {
        let mut grid = ExplorationGrid::new(20, 20, 1);
        grid.mark_visible(0, IVec2::new(10, 10), 2, 0);
        // (13, 10) is 3 cells out: inside the fringe, below full visibility.
        let v = grid.query_visibility(0, IVec2::new(13, 10));
        assert!(v > EXPLORED_ALPHA && v < FULL_VISIBILITY, "fringe alpha was {v}");
    }

    #[test]
    fn test_invalid_team_mark_is_noop() {
        let mut grid = ExplorationGrid::new(10, 10, 2);
        grid.mark_visible(5, IVec2::new(5, 5), 2, 0);
        assert_eq!(grid.query_visibility(0, IVec2::new(5, 5)), UNEXPLORED);
        assert_eq!(grid.query_visibility(1, IVec2::new(5, 5)), UNEXPLORED);
    }

    #[test]
    #[should_panic]
    fn test_invalid_team_query_panics() {
        let grid = ExplorationGrid::new(10, 10, 2);
        grid.query_visibility(2, IVec2::new(0, 0));
    }

    #[test]
    fn test_out_of_bounds_marks_clamped() {
        let mut grid = ExplorationGrid::new(10, 10, 1);
        // Near the corner: part of the sight disc falls off the grid.
        grid.mark_visible(0, IVec2::new(0, 0), 3, 0);
        assert_eq!(grid.query_visibility(0, IVec2::new(0, 0)), FULL_VISIBILITY);
        assert_eq!(grid.query_visibility(0, IVec2::new(-1, 0)), UNEXPLORED);
    }

    #[test]
    fn test_cache_reuse_and_staleness_pruning() {
        let mut grid = ExplorationGrid::new(32, 32, 1);
        grid.mark_visible(0, IVec2::new(10, 10), 4, 1);
        grid.mark_visible(0, IVec2::new(10, 10), 4, 2);
        assert_eq!(grid.cache_len(), 1);

        // A different position creates a second entry.
        grid.mark_visible(0, IVec2::new(20, 20), 4, 3);
        assert_eq!(grid.cache_len(), 2);

        // Only the second entry survives the staleness bound.
        grid.mark_visible(0, IVec2::new(20, 20), 4, 3 + SIGHT_CACHE_STALE_TICKS);
        grid.prune_cache(3 + SIGHT_CACHE_STALE_TICKS);
        assert_eq!(grid.cache_len(), 1);
    }
}
