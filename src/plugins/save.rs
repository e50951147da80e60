use bevy::prelude::*;
use bevy_save::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{MoveTarget, Team, Unit, Vision};
use crate::plugins::core::GameState;
use crate::resources::fow_surface::AlphaSurface;
use crate::resources::{CliArgs, Display, FowSurfaces, GameSettings, WorldClock};

/// Marker resource indicating a CLI-triggered load is pending.
/// Consumed after the load is attempted.
#[derive(Resource)]
struct CliLoadPending(String);

/// Marker resource set right after Display state is restored from a save.
/// The HUD skips its per-frame summary refresh while this is present so
/// the restored strings are not clobbered before they render once.
#[derive(Resource)]
pub struct DisplayRestored;

/// Errors restoring fog/display state from a save document.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A sparse fog pixel points outside the surface. The surface is left
    /// untouched when this is returned.
    #[error("fog pixel index {index} out of range for {cells} cells")]
    IndexOutOfRange { index: u32, cells: u32 },
    #[error("malformed save document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("save document i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not determine save directory")]
    NoSaveDir,
}

/// One explored fog pixel in the sparse save encoding. Unexplored cells
/// (value 0) are omitted from the document entirely.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FowPixelEntry {
    pub index: u32,
    /// Alpha quantized to 0..=255.
    pub pixel: u8,
}

/// Persisted fog state for one surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimapSave {
    pub width: u32,
    pub height: u32,
    #[serde(rename = "fowPixels")]
    pub fow_pixels: Vec<FowPixelEntry>,
}

/// Persisted HUD display state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySave {
    pub title: String,
    pub text: String,
    #[serde(rename = "infoText")]
    pub info_text: String,
    #[serde(rename = "progressBar")]
    pub progress_bar: i32,
    #[serde(rename = "downSelectedPos")]
    pub down_selected_pos: i32,
    #[serde(rename = "currentColor")]
    pub current_color: usize,
}

/// The JSON sidecar document written next to the entity snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveDocument {
    pub minimap: MinimapSave,
    pub display: DisplaySave,
}

/// Encodes a fog surface sparsely: only explored pixels are written,
/// quantized to a byte.
pub fn encode_fow_surface(surface: &AlphaSurface) -> MinimapSave {
    let fow_pixels = surface
        .pixels()
        .iter()
        .enumerate()
        .filter_map(|(index, &value)| {
            let pixel = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
            (pixel != 0).then_some(FowPixelEntry {
                index: index as u32,
                pixel,
            })
        })
        .collect();

    MinimapSave {
        width: surface.width(),
        height: surface.height(),
        fow_pixels,
    }
}

/// Decodes a sparse fog save into `surface`.
///
/// Every index is validated against the surface before any pixel is
/// applied, so a bad document never leaves the surface half-written.
pub fn decode_fow_surface(save: &MinimapSave, surface: &mut AlphaSurface) -> Result<(), LoadError> {
    let cells = surface.len() as u32;
    for entry in &save.fow_pixels {
        if entry.index >= cells {
            return Err(LoadError::IndexOutOfRange {
                index: entry.index,
                cells,
            });
        }
    }

    surface.fill(0.0);
    for entry in &save.fow_pixels {
        surface.pixels_mut()[entry.index as usize] = entry.pixel as f32 / 255.0;
    }
    Ok(())
}

fn save_doc_path(name: &str) -> Result<std::path::PathBuf, LoadError> {
    dirs::data_dir()
        .map(|mut path| {
            path.push("warfront");
            path.push(format!("{name}_fow.json"));
            path
        })
        .ok_or(LoadError::NoSaveDir)
}

/// Writes the fog/display sidecar document for `name`.
pub fn write_save_document(name: &str, doc: &SaveDocument) -> Result<(), LoadError> {
    let path = save_doc_path(name)?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(doc)?;
    std::fs::write(&path, json)?;
    info!("Saved fog document to {:?}", path);
    Ok(())
}

/// Reads the fog/display sidecar document for `name`.
/// A missing document is not an error; the caller starts from blank fog.
pub fn read_save_document(name: &str) -> Result<Option<SaveDocument>, LoadError> {
    let path = save_doc_path(name)?;
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)?;
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Plugin that integrates bevy_save for entity/resource persistence and
/// adds the JSON sidecar carrying explored-fog and HUD state.
pub struct PersistencePlugin;

impl Plugin for PersistencePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(SavePlugins);

        register_saveable_types(app);

        app.add_systems(Startup, check_cli_load_arg);
        app.add_systems(
            Update,
            (
                save_game_system.run_if(in_state(GameState::Playing)),
                load_game_system.run_if(in_state(GameState::Playing)),
                cli_load_system.run_if(resource_exists::<CliLoadPending>),
            ),
        );
    }
}

/// Registers the types bevy_save needs to snapshot.
fn register_saveable_types(app: &mut App) {
    app.register_type::<Unit>()
        .register_type::<Team>()
        .register_type::<Vision>()
        .register_type::<MoveTarget>()
        .register_type::<WorldClock>()
        .register_type::<GameSettings>();
}

fn save_name_from_args(world: &World) -> String {
    world
        .get_resource::<CliArgs>()
        .and_then(|args| args.save_as.clone())
        .unwrap_or_else(|| "quicksave".to_string())
}

/// System that triggers a quicksave when F5 is pressed.
/// Saves the entity snapshot plus the fog/display sidecar document.
fn save_game_system(world: &mut World) {
    let should_save = world
        .resource::<ButtonInput<KeyCode>>()
        .just_pressed(KeyCode::F5);
    if !should_save {
        return;
    }

    let save_name = save_name_from_args(world);
    info!("Saving game to '{}'...", save_name);

    match world.save(save_name.as_str()) {
        Ok(_) => info!("Game saved successfully to '{}'", save_name),
        Err(e) => {
            error!("Failed to save game: {:?}", e);
            return;
        }
    }

    let doc = {
        let surfaces = world.resource::<FowSurfaces>();
        let display = world.resource::<Display>();
        SaveDocument {
            minimap: encode_fow_surface(surfaces.next()),
            display: DisplaySave {
                title: display.title.clone(),
                text: display.text.clone(),
                info_text: display.info_text.clone(),
                progress_bar: display.progress_bar,
                down_selected_pos: display.down_selected_pos,
                current_color: display.current_color(),
            },
        }
    };

    if let Err(e) = write_save_document(&save_name, &doc) {
        error!("Failed to write fog document: {}", e);
    }
}

/// System that triggers a quickload when F9 is pressed.
fn load_game_system(world: &mut World) {
    let should_load = world
        .resource::<ButtonInput<KeyCode>>()
        .just_pressed(KeyCode::F9);
    if !should_load {
        return;
    }

    info!("Loading game...");
    match world.load("quicksave") {
        Ok(_) => {
            info!("Game loaded successfully from 'quicksave'");
            apply_save_document(world, "quicksave");
        }
        Err(e) => error!("Failed to load game: {:?}", e),
    }
}

/// Applies the fog/display sidecar after the entity snapshot loaded.
/// A missing document means blank fog; a malformed one leaves the fog
/// untouched and logs the error.
fn apply_save_document(world: &mut World, name: &str) {
    let doc = match read_save_document(name) {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            warn!("No fog document for '{}'; starting from blank fog", name);
            if let Some(mut surfaces) = world.get_resource_mut::<FowSurfaces>() {
                surfaces.reset();
            }
            return;
        }
        Err(e) => {
            error!("Failed to read fog document for '{}': {}", name, e);
            return;
        }
    };

    if let Some(mut surfaces) = world.get_resource_mut::<FowSurfaces>() {
        surfaces.reset();
        if let Err(e) = decode_fow_surface(&doc.minimap, surfaces.next_mut()) {
            error!("Failed to decode fog pixels: {}", e);
        }
    }

    let display_restored = match world.get_resource_mut::<Display>() {
        Some(mut display) => {
            display.title = doc.display.title;
            display.text = doc.display.text;
            display.info_text = doc.display.info_text;
            display.progress_bar = doc.display.progress_bar;
            display.down_selected_pos = doc.display.down_selected_pos;
            display.set_current_color(doc.display.current_color);
            true
        }
        None => false,
    };
    if display_restored {
        world.insert_resource(DisplayRestored);
    }
}

/// Checks CLI arguments for --load and inserts CliLoadPending if present.
fn check_cli_load_arg(mut commands: Commands, cli_args: Res<CliArgs>) {
    if let Some(ref save_name) = cli_args.load_save {
        info!("CLI: Queueing load of save '{}'", save_name);
        commands.insert_resource(CliLoadPending(save_name.clone()));
    }
}

/// Processes CLI-triggered load. Runs once then removes the pending marker.
fn cli_load_system(world: &mut World) {
    let save_name = {
        let pending = world.remove_resource::<CliLoadPending>();
        match pending {
            Some(p) => p.0,
            None => return,
        }
    };

    info!("CLI: Loading save '{}'...", save_name);
    match world.load(save_name.as_str()) {
        Ok(_) => {
            info!("CLI: Save '{}' loaded successfully", save_name);
            apply_save_document(world, &save_name);
        }
        Err(e) => {
            error!("CLI: Failed to load save '{}': {:?}", save_name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fow_round_trip_preserves_quantized_values() {
        let mut surface = AlphaSurface::new(4, 4);
        // Exact byte fractions survive the f32 <-> u8 quantization.
        surface.set(0, 0, 255.0 / 255.0);
        surface.set(1, 0, 128.0 / 255.0);
        surface.set(2, 3, 1.0 / 255.0);

        let save = encode_fow_surface(&surface);
        let mut restored = AlphaSurface::new(4, 4);
        decode_fow_surface(&save, &mut restored).unwrap();

        assert_eq!(surface.pixels(), restored.pixels());
    }

    #[test]
    fn test_unexplored_pixels_are_skipped() {
        let mut surface = AlphaSurface::new(4, 4);
        surface.set(2, 1, 0.5);
        let save = encode_fow_surface(&surface);
        assert_eq!(save.fow_pixels.len(), 1);
        assert_eq!(save.fow_pixels[0].index, 1 * 4 + 2);
    }

    #[test]
    fn test_out_of_range_index_rejects_whole_document() {
        let save = MinimapSave {
            width: 4,
            height: 4,
            fow_pixels: vec![
                FowPixelEntry { index: 0, pixel: 200 },
                FowPixelEntry { index: 16, pixel: 10 },
            ],
        };
        let mut surface = AlphaSurface::new(4, 4);
        surface.set(3, 3, 0.25);

        let err = decode_fow_surface(&save, &mut surface).unwrap_err();
        assert!(matches!(
            err,
            LoadError::IndexOutOfRange { index: 16, cells: 16 }
        ));
        // Valid leading entries were not applied.
        assert_eq!(surface.get(0, 0), 0.0);
        assert_eq!(surface.get(3, 3), 0.25);
    }

    #[test]
    fn test_save_document_json_field_names() {
        let doc = SaveDocument {
            minimap: MinimapSave {
                width: 2,
                height: 2,
                fow_pixels: vec![FowPixelEntry { index: 3, pixel: 128 }],
            },
            display: DisplaySave {
                title: "Castle".to_string(),
                text: String::new(),
                info_text: String::new(),
                progress_bar: 40,
                down_selected_pos: -1,
                current_color: 2,
            },
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"fowPixels\""));
        assert!(json.contains("\"infoText\""));
        assert!(json.contains("\"progressBar\""));
        assert!(json.contains("\"downSelectedPos\""));
        assert!(json.contains("\"currentColor\""));

        let parsed: SaveDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.display.progress_bar, 40);
        assert_eq!(parsed.minimap.fow_pixels[0].index, 3);
    }
}
