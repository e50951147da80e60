use bevy::prelude::*;

/// Ratio between the terrain surface grid and the fog/minimap grid.
/// One fog cell covers `CELL_SCALE x CELL_SCALE` surface cells.
pub const CELL_SCALE: u32 = 2;

/// Heights run 0.0..=MAX_HEIGHT; minimap brightness is normalized against this.
pub const MAX_HEIGHT: f32 = 6.0;

/// Terrain surface classification, used to pick a tileset pixmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceType {
    /// Primary grassland
    Grass,
    /// Dry secondary grass - transition band
    ScrubGrass,
    /// Bare ground / dirt
    Ground,
    /// Exposed rock at high elevation
    Stone,
    /// Submerged ground below the water level
    Riverbed,
}

impl SurfaceType {
    /// All surface types, in tileset index order.
    pub const ALL: [SurfaceType; 5] = [
        SurfaceType::Grass,
        SurfaceType::ScrubGrass,
        SurfaceType::Ground,
        SurfaceType::Stone,
        SurfaceType::Riverbed,
    ];

    /// Index into the tileset texture / pixmap table.
    pub fn texture_index(&self) -> u32 {
        match self {
            SurfaceType::Grass => 0,
            SurfaceType::ScrubGrass => 1,
            SurfaceType::Ground => 2,
            SurfaceType::Stone => 3,
            SurfaceType::Riverbed => 4,
        }
    }
}

/// Static map objects occupying a surface cell.
/// Cells with an object render on the minimap with the object's own color
/// instead of the sampled terrain color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectClass {
    Tree,
    DeadTree,
    Boulder,
    Bush,
}

impl ObjectClass {
    /// Fixed minimap color for this object type (RGB, 0..=1).
    pub fn color(&self) -> Vec3 {
        match self {
            ObjectClass::Tree => Vec3::new(0.0, 0.4, 0.0),
            ObjectClass::DeadTree => Vec3::new(0.4, 0.3, 0.2),
            ObjectClass::Boulder => Vec3::new(0.5, 0.5, 0.5),
            ObjectClass::Bush => Vec3::new(0.2, 0.5, 0.1),
        }
    }
}

/// One cell of the terrain surface grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceCell {
    pub surface: SurfaceType,
    /// Vertex height, 0.0..=MAX_HEIGHT.
    pub height: f32,
    pub object: Option<ObjectClass>,
}

impl Default for SurfaceCell {
    fn default() -> Self {
        Self {
            surface: SurfaceType::Grass,
            height: MAX_HEIGHT / 2.0,
            object: None,
        }
    }
}

/// Resource containing the terrain surface grid.
///
/// This is the source of truth for terrain and is read by:
/// - the worldmap plugin to spawn the terrain tilemap
/// - the minimap projector to derive base colors
/// - procgen during map generation
#[derive(Resource)]
pub struct MapData {
    /// Width of the map in surface cells
    pub width: u32,
    /// Height of the map in surface cells
    pub height: u32,
    /// Cells at or below this height are under water.
    pub water_level: f32,
    /// Flat array of cells, stored row-major (y * width + x)
    cells: Vec<SurfaceCell>,
}

impl MapData {
    /// Creates a new MapData with the given dimensions, filled with default grass.
    pub fn new(width: u32, height: u32) -> Self {
        let cells = vec![SurfaceCell::default(); (width * height) as usize];
        Self {
            width,
            height,
            water_level: 1.5,
            cells,
        }
    }

    /// Gets the cell at the given coordinates.
    /// Returns None if coordinates are out of bounds.
    pub fn cell(&self, x: u32, y: u32) -> Option<&SurfaceCell> {
        if x < self.width && y < self.height {
            Some(&self.cells[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Gets a mutable reference to the cell at the given coordinates.
    pub fn cell_mut(&mut self, x: u32, y: u32) -> Option<&mut SurfaceCell> {
        if x < self.width && y < self.height {
            Some(&mut self.cells[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Sets the cell at the given coordinates.
    /// Returns true if successful, false if out of bounds.
    pub fn set_cell(&mut self, x: u32, y: u32, cell: SurfaceCell) -> bool {
        if x < self.width && y < self.height {
            self.cells[(y * self.width + x) as usize] = cell;
            true
        } else {
            false
        }
    }

    /// Returns an iterator over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &SurfaceCell)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| (x, y, &self.cells[(y * self.width + x) as usize]))
        })
    }

    /// Returns whether the given coordinates are within the map bounds.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Returns whether the cell at the given coordinates is under water.
    pub fn is_under_water(&self, x: u32, y: u32) -> bool {
        self.cell(x, y)
            .map(|c| c.height <= self.water_level)
            .unwrap_or(false)
    }
}

impl Default for MapData {
    fn default() -> Self {
        // Default to a 64x64 map for testing
        Self::new(64, 64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_cell_is_none() {
        let map = MapData::new(8, 8);
        assert!(map.cell(7, 7).is_some());
        assert!(map.cell(8, 0).is_none());
        assert!(map.cell(0, 8).is_none());
    }

    #[test]
    fn test_set_and_get_cell() {
        let mut map = MapData::new(8, 8);
        let cell = SurfaceCell {
            surface: SurfaceType::Stone,
            height: 5.0,
            object: Some(ObjectClass::Boulder),
        };
        assert!(map.set_cell(3, 4, cell));
        assert_eq!(map.cell(3, 4), Some(&cell));
        assert!(!map.set_cell(8, 8, cell));
    }

    #[test]
    fn test_under_water() {
        let mut map = MapData::new(4, 4);
        map.water_level = 2.0;
        map.cell_mut(0, 0).unwrap().height = 1.0;
        map.cell_mut(1, 0).unwrap().height = 3.0;
        assert!(map.is_under_water(0, 0));
        assert!(!map.is_under_water(1, 0));
    }
}
