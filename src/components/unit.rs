use bevy::prelude::*;

/// Marker component that identifies an entity as a unit in the world.
#[derive(Component, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct Unit;

/// Team a unit contributes visibility to. Index into the fixed team range
/// [0, team_count); validated by the sight systems.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub struct Team(pub usize);

/// Sight contribution of a unit, in fog-grid cells.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Vision {
    pub sight_range: u32,
}

impl Default for Vision {
    fn default() -> Self {
        Self { sight_range: 5 }
    }
}

/// Simple wander destination so units move and the fog state changes.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct MoveTarget {
    pub target: Vec2,
    pub speed: f32,
}
