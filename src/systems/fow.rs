use bevy::prelude::*;

use crate::events::{FogSettingChangedEvent, FowCheckpointEvent};
use crate::resources::{FowSurfaces, GameSettings};

/// Rotates the fog surfaces once per simulation tick: flips current/next
/// and rebuilds the accumulating surface from the active fog policy.
pub fn fow_rotate_system(mut surfaces: ResMut<FowSurfaces>, settings: Res<GameSettings>) {
    surfaces.rotate(settings.fog_policy());
}

/// Applies fog-setting toggles. The surfaces get an extra refresh rotation
/// so the change shows immediately instead of on the next tick.
pub fn fog_setting_event_system(
    mut events: EventReader<FogSettingChangedEvent>,
    mut settings: ResMut<GameSettings>,
    mut surfaces: ResMut<FowSurfaces>,
) {
    for event in events.read() {
        if settings.fog_of_war == event.fog_of_war
            && settings.reveal_resources == event.reveal_resources
        {
            continue;
        }
        settings.fog_of_war = event.fog_of_war;
        settings.reveal_resources = event.reveal_resources;
        info!(
            "Fog of war {}, reveal-resources {}",
            if settings.fog_of_war { "on" } else { "off" },
            if settings.reveal_resources { "on" } else { "off" }
        );
        surfaces.rotate(settings.fog_policy());
    }
}

/// Handles scenario checkpoint requests: deep-copy the surfaces to the
/// backup slot, or roll them back. Nothing triggers these automatically.
pub fn fow_checkpoint_system(
    mut events: EventReader<FowCheckpointEvent>,
    mut surfaces: ResMut<FowSurfaces>,
) {
    for event in events.read() {
        match event {
            FowCheckpointEvent::Save => {
                surfaces.copy_to_backup();
                info!("Fog surfaces checkpointed");
            }
            FowCheckpointEvent::Restore => {
                surfaces.restore_from_backup();
                info!("Fog surfaces restored from checkpoint");
            }
        }
    }
}
