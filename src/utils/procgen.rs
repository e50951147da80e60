use bevy::prelude::*;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::resources::map_data::MAX_HEIGHT;
use crate::resources::{MapData, ObjectClass, SurfaceType};

/// Parameters for procedural map generation.
/// The same config always produces the same map.
#[derive(Clone, Debug)]
pub struct MapGenConfig {
    pub seed: u32,
    pub width: u32,
    pub height: u32,
    /// Base frequency of the fractal heightmap noise.
    pub frequency: f64,
    pub octaves: usize,
    pub water_level: f32,
}

impl Default for MapGenConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            width: 128,
            height: 128,
            frequency: 0.03,
            octaves: 4,
            water_level: 1.5,
        }
    }
}

/// Generates terrain from fractal Perlin noise.
///
/// Heights come from an octaved noise field normalized into
/// 0.0..=MAX_HEIGHT. Surface types are banded by height relative to the
/// water level, and map objects are scattered by a seeded RNG so the
/// whole map is reproducible from the config alone.
pub fn generate_map(config: &MapGenConfig) -> MapData {
    let fbm = Fbm::<Perlin>::new(config.seed)
        .set_frequency(config.frequency)
        .set_octaves(config.octaves);
    let mut rng = StdRng::seed_from_u64(config.seed as u64);

    let mut map = MapData::new(config.width, config.height);
    map.water_level = config.water_level;

    for y in 0..config.height {
        for x in 0..config.width {
            let noise = fbm.get([x as f64, y as f64]) as f32;
            let height = ((noise + 1.0) / 2.0).clamp(0.0, 1.0) * MAX_HEIGHT;
            let surface = surface_for_height(height, config.water_level);
            let object = if height > config.water_level {
                roll_object(&mut rng, surface)
            } else {
                None
            };
            if let Some(cell) = map.cell_mut(x, y) {
                cell.height = height;
                cell.surface = surface;
                cell.object = object;
            }
        }
    }

    info!(
        "Generated {}x{} map from seed {}",
        config.width, config.height, config.seed
    );
    map
}

fn surface_for_height(height: f32, water_level: f32) -> SurfaceType {
    if height <= water_level {
        SurfaceType::Riverbed
    } else if height < water_level + 0.8 {
        SurfaceType::Ground
    } else if height < 3.5 {
        SurfaceType::Grass
    } else if height < 4.5 {
        SurfaceType::ScrubGrass
    } else {
        SurfaceType::Stone
    }
}

fn roll_object(rng: &mut StdRng, surface: SurfaceType) -> Option<ObjectClass> {
    let roll: f32 = rng.gen();
    match surface {
        SurfaceType::Grass if roll < 0.03 => Some(ObjectClass::Tree),
        SurfaceType::Grass if roll < 0.05 => Some(ObjectClass::Bush),
        SurfaceType::ScrubGrass if roll < 0.02 => Some(ObjectClass::DeadTree),
        SurfaceType::Stone if roll < 0.02 => Some(ObjectClass::Boulder),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic() {
        let config = MapGenConfig {
            seed: 42,
            width: 32,
            height: 32,
            ..Default::default()
        };
        let a = generate_map(&config);
        let b = generate_map(&config);
        for (x, y, cell) in a.iter() {
            assert_eq!(Some(cell), b.cell(x, y));
        }
    }

    #[test]
    fn test_generated_dimensions() {
        let config = MapGenConfig {
            width: 48,
            height: 16,
            ..Default::default()
        };
        let map = generate_map(&config);
        assert_eq!(map.width, 48);
        assert_eq!(map.height, 16);
        assert!(map.cell(47, 15).is_some());
    }

    #[test]
    fn test_underwater_cells_are_riverbed_without_objects() {
        let config = MapGenConfig {
            seed: 7,
            width: 64,
            height: 64,
            ..Default::default()
        };
        let map = generate_map(&config);
        for (_, _, cell) in map.iter() {
            assert!(cell.height >= 0.0 && cell.height <= MAX_HEIGHT);
            if cell.height <= map.water_level {
                assert_eq!(cell.surface, SurfaceType::Riverbed);
                assert!(cell.object.is_none());
            }
        }
    }
}
