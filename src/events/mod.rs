use bevy::prelude::*;

/// Event emitted once the terrain grid is generated and sized.
/// Triggers fog grid initialization, minimap recompute, and tilemap spawn.
#[derive(Event, Debug)]
pub struct MapLoadedEvent;

/// Event emitted when the fog settings are toggled at runtime.
/// The fog surfaces refresh with an extra rotation so the change takes
/// effect immediately instead of waiting for the next tick.
#[derive(Event, Debug)]
pub struct FogSettingChangedEvent {
    pub fog_of_war: bool,
    pub reveal_resources: bool,
}

/// Scenario checkpoint requests for the fog surfaces.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FowCheckpointEvent {
    /// Deep-copy the surfaces into the backup slot.
    Save,
    /// Roll the surfaces back to the last backup.
    Restore,
}
