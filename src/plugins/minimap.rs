use bevy::prelude::*;

use crate::plugins::core::GameState;
use crate::systems::minimap::{minimap_recompute_system, MinimapTextures};

/// On-screen size of the minimap in pixels.
const MINIMAP_SIZE: f32 = 192.0;
/// Offset of the minimap center from the bottom-left screen corner.
const MINIMAP_MARGIN: f32 = 16.0;

/// Plugin that draws the minimap: terrain base layer below, fog overlay
/// on top, sharing the fog texture with the world overlay.
pub struct MinimapPlugin;

impl Plugin for MinimapPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Playing), spawn_minimap_sprites)
            .add_systems(
                Update,
                minimap_recompute_system.run_if(in_state(GameState::Playing)),
            );
    }
}

/// Marker component for the minimap sprite pair.
#[derive(Component)]
pub struct MinimapSprite;

/// Spawns the two stacked minimap sprites in the bottom-left corner.
/// The camera is static, so plain world-space sprites at a high z work
/// as screen-anchored UI.
fn spawn_minimap_sprites(
    mut commands: Commands,
    minimap: Res<MinimapTextures>,
    windows: Query<&Window>,
    existing: Query<Entity, With<MinimapSprite>>,
) {
    if !existing.is_empty() {
        return;
    }

    let Ok(window) = windows.get_single() else {
        warn!("No window found; minimap sprites not spawned");
        return;
    };
    let corner = Vec2::new(
        -window.width() / 2.0 + MINIMAP_MARGIN + MINIMAP_SIZE / 2.0,
        -window.height() / 2.0 + MINIMAP_MARGIN + MINIMAP_SIZE / 2.0,
    );

    commands.spawn((
        Name::new("Minimap Base"),
        MinimapSprite,
        Sprite {
            image: minimap.base.clone(),
            custom_size: Some(Vec2::splat(MINIMAP_SIZE)),
            ..default()
        },
        Transform::from_xyz(corner.x, corner.y, 50.0),
    ));

    commands.spawn((
        Name::new("Minimap Fog"),
        MinimapSprite,
        Sprite {
            image: minimap.fog.clone(),
            custom_size: Some(Vec2::splat(MINIMAP_SIZE)),
            ..default()
        },
        Transform::from_xyz(corner.x, corner.y, 51.0),
    ));

    info!("Minimap spawned at {:?}", corner);
}
