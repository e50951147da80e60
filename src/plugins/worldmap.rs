use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy_ecs_tilemap::prelude::*;
use rand::Rng;

use crate::components::{MoveTarget, Team, Unit, Vision};
use crate::resources::map_data::CELL_SCALE;
use crate::events::MapLoadedEvent;
use crate::plugins::core::GameState;
use crate::resources::{
    CliArgs, ExplorationGrid, FowSurfaces, GameSettings, MapData, Tileset, WorldClock,
};
use crate::systems::minimap::{compute_minimap_pixels, MinimapTextures};
use crate::systems::{wander_system, FowTextureBlender};
use crate::utils::grid::{surface_to_world, TILE_SIZE};
use crate::utils::procgen::{generate_map, MapGenConfig};

/// Plugin that builds the world: terrain, fog state, fog/minimap
/// textures, and the units that carry vision across the map.
pub struct WorldMapPlugin;

impl Plugin for WorldMapPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldClock>()
            .add_event::<MapLoadedEvent>()
            .add_systems(Startup, setup_world)
            .add_systems(
                OnEnter(GameState::Playing),
                (spawn_terrain_tilemap, spawn_fog_overlay, spawn_units),
            )
            .add_systems(
                FixedUpdate,
                wander_system.run_if(in_state(GameState::Playing)),
            );
    }
}

/// Marker component for the terrain tilemap.
#[derive(Component)]
pub struct TerrainMap;

/// Marker component for the world-space fog overlay sprite.
#[derive(Component)]
pub struct FogOverlay;

/// Resource holding the tileset strip texture used by the terrain tilemap.
#[derive(Resource)]
pub struct TilesetHandle(pub Handle<Image>);

const UNITS_PER_TEAM: usize = 4;
const UNIT_SPEED: f32 = 96.0;

/// Team tint colors for unit sprites.
const TEAM_COLORS: [Color; 4] = [
    Color::srgb(0.9, 0.2, 0.2),
    Color::srgb(0.2, 0.4, 0.9),
    Color::srgb(0.9, 0.8, 0.2),
    Color::srgb(0.2, 0.8, 0.4),
];

/// Generates the map, allocates the fog state and its textures, and
/// transitions to Playing once everything the render systems need is in
/// place.
fn setup_world(
    mut commands: Commands,
    cli_args: Res<CliArgs>,
    mut images: ResMut<Assets<Image>>,
    mut map_events: EventWriter<MapLoadedEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let seed = cli_args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let config = MapGenConfig {
        seed,
        width: cli_args.map_size,
        height: cli_args.map_size,
        ..Default::default()
    };
    let map_data = generate_map(&config);

    let settings = GameSettings {
        fog_of_war: !cli_args.no_fog,
        reveal_resources: cli_args.reveal_resources,
        ..Default::default()
    };

    let mut surfaces = FowSurfaces::for_map(map_data.width, map_data.height);
    if settings.reveal_resources {
        // Reveal mode starts with the map interior already at the
        // explored shade instead of opaque fog.
        surfaces.pre_reveal(
            map_data.width / CELL_SCALE,
            map_data.height / CELL_SCALE,
        );
    }
    let fow_width = surfaces.width();
    let fow_height = surfaces.height();
    let exploration = ExplorationGrid::new(fow_width, fow_height, settings.team_count);

    let tileset = Tileset::procedural();

    // Fog overlay texture: black, fully opaque until explored.
    let fog_image = new_rgba_image(fow_width, fow_height, [0, 0, 0, 255]);
    let fog_handle = images.add(fog_image);

    // Minimap base layer, recomputed again whenever a map load fires.
    let base_pixels = compute_minimap_pixels(&map_data, &tileset, fow_width, fow_height);
    let base_image = Image::new(
        bevy::render::render_resource::Extent3d {
            width: fow_width,
            height: fow_height,
            depth_or_array_layers: 1,
        },
        bevy::render::render_resource::TextureDimension::D2,
        base_pixels,
        bevy::render::render_resource::TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    );
    let base_handle = images.add(base_image);

    commands.insert_resource(FowTextureBlender::new(
        fow_width,
        fow_height,
        fog_handle.clone(),
    ));
    commands.insert_resource(MinimapTextures {
        base: base_handle,
        fog: fog_handle,
        width: fow_width,
        height: fow_height,
    });
    commands.insert_resource(TilesetHandle(images.add(tileset_strip_image(&tileset))));
    commands.insert_resource(map_data);
    commands.insert_resource(tileset);
    commands.insert_resource(surfaces);
    commands.insert_resource(exploration);
    commands.insert_resource(settings);

    map_events.send(MapLoadedEvent);
    next_state.set(GameState::Playing);

    info!(
        "World ready: {0}x{0} map, {1}x{2} fog grid, seed {3}",
        cli_args.map_size, fow_width, fow_height, seed
    );
}

fn new_rgba_image(width: u32, height: u32, fill: [u8; 4]) -> Image {
    let mut data = vec![0u8; (width * height * 4) as usize];
    for pixel in data.chunks_exact_mut(4) {
        pixel.copy_from_slice(&fill);
    }
    // Use both MAIN_WORLD and RENDER_WORLD so the CPU copy stays writable
    Image::new(
        bevy::render::render_resource::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        bevy::render::render_resource::TextureDimension::D2,
        data,
        bevy::render::render_resource::TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    )
}

/// Builds a horizontal strip texture with one tile per surface type,
/// sampled from the tileset pixmaps at the tilemap's tile resolution.
fn tileset_strip_image(tileset: &Tileset) -> Image {
    use crate::resources::map_data::SurfaceType;
    use crate::resources::tileset::NEUTRAL_SURFACE_COLOR;

    let tile_px = TILE_SIZE as u32;
    let width = tile_px * SurfaceType::ALL.len() as u32;
    let height = tile_px;
    let mut data = vec![0u8; (width * height * 4) as usize];

    for (index, surface) in SurfaceType::ALL.iter().enumerate() {
        let pixmap = tileset.surf_pixmap(*surface);
        let start_x = index as u32 * tile_px;
        for y in 0..tile_px {
            for x in 0..tile_px {
                let color = match pixmap {
                    Some(p) => p.pixel(x * p.width() / tile_px, y * p.height() / tile_px),
                    None => NEUTRAL_SURFACE_COLOR,
                };
                let idx = (((y * width) + start_x + x) * 4) as usize;
                data[idx] = (color.x * 255.0).round() as u8;
                data[idx + 1] = (color.y * 255.0).round() as u8;
                data[idx + 2] = (color.z * 255.0).round() as u8;
                data[idx + 3] = (color.w * 255.0).round() as u8;
            }
        }
    }

    Image::new(
        bevy::render::render_resource::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        bevy::render::render_resource::TextureDimension::D2,
        data,
        bevy::render::render_resource::TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    )
}

/// Spawns the terrain tilemap from MapData.
/// Skips if the tilemap already exists.
fn spawn_terrain_tilemap(
    mut commands: Commands,
    map_data: Res<MapData>,
    tileset: Option<Res<TilesetHandle>>,
    existing: Query<Entity, With<TerrainMap>>,
) {
    if !existing.is_empty() {
        return;
    }
    let Some(tileset) = tileset else {
        error!("TilesetHandle resource not found! Tilemap cannot be spawned.");
        return;
    };

    let map_size = TilemapSize {
        x: map_data.width,
        y: map_data.height,
    };
    let tilemap_entity = commands.spawn_empty().id();
    let mut tile_storage = TileStorage::empty(map_size);

    for (x, y, cell) in map_data.iter() {
        let tile_pos = TilePos { x, y };
        let tile_entity = commands
            .spawn(TileBundle {
                position: tile_pos,
                tilemap_id: TilemapId(tilemap_entity),
                texture_index: TileTextureIndex(cell.surface.texture_index()),
                ..Default::default()
            })
            .id();
        tile_storage.set(&tile_pos, tile_entity);
    }

    let tile_size = TilemapTileSize {
        x: TILE_SIZE,
        y: TILE_SIZE,
    };
    let grid_size: TilemapGridSize = tile_size.into();
    let map_type = TilemapType::default();

    commands.entity(tilemap_entity).insert((
        TilemapBundle {
            grid_size,
            map_type,
            size: map_size,
            storage: tile_storage,
            texture: TilemapTexture::Single(tileset.0.clone()),
            tile_size,
            // Center the tilemap at origin by offsetting by half the map size
            transform: Transform::from_xyz(
                -(map_size.x as f32 * tile_size.x) / 2.0,
                -(map_size.y as f32 * tile_size.y) / 2.0,
                -10.0,
            ),
            ..Default::default()
        },
        TerrainMap,
    ));

    info!("Terrain tilemap spawned: {}x{} tiles", map_size.x, map_size.y);
}

/// Spawns the world-space fog overlay: one sprite stretching the fog
/// texture across the whole map, above terrain and units.
fn spawn_fog_overlay(
    mut commands: Commands,
    map_data: Res<MapData>,
    blender: Res<FowTextureBlender>,
    existing: Query<Entity, With<FogOverlay>>,
) {
    if !existing.is_empty() {
        return;
    }

    let world_size = Vec2::new(
        map_data.width as f32 * TILE_SIZE,
        map_data.height as f32 * TILE_SIZE,
    );

    commands.spawn((
        Name::new("Fog Overlay"),
        FogOverlay,
        Sprite {
            image: blender.texture().clone(),
            custom_size: Some(world_size),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 5.0),
    ));
}

/// Spawns wandering units for every team at random land positions.
fn spawn_units(
    mut commands: Commands,
    map_data: Res<MapData>,
    settings: Res<GameSettings>,
    existing: Query<Entity, With<Unit>>,
) {
    if !existing.is_empty() {
        return;
    }

    let mut rng = rand::thread_rng();
    let land_cells: Vec<(u32, u32)> = map_data
        .iter()
        .filter(|(x, y, _)| !map_data.is_under_water(*x, *y))
        .map(|(x, y, _)| (x, y))
        .collect();

    if land_cells.is_empty() {
        warn!("No land cells found for unit spawning!");
        return;
    }

    for team in 0..settings.team_count {
        let color = TEAM_COLORS[team % TEAM_COLORS.len()];
        for i in 0..UNITS_PER_TEAM {
            let (x, y) = land_cells[rng.gen_range(0..land_cells.len())];
            let pos = surface_to_world(
                IVec2::new(x as i32, y as i32),
                map_data.width,
                map_data.height,
            );
            commands.spawn((
                Name::new(format!("Unit t{team} #{i}")),
                Unit,
                Team(team),
                Vision::default(),
                MoveTarget {
                    target: pos,
                    speed: UNIT_SPEED,
                },
                Sprite::from_color(color, Vec2::splat(TILE_SIZE * 0.6)),
                Transform::from_xyz(pos.x, pos.y, 2.0),
            ));
        }
    }

    info!(
        "Spawned {} units across {} teams",
        UNITS_PER_TEAM * settings.team_count,
        settings.team_count
    );
}
