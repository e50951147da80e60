use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::*;
use bevy_egui::EguiPlugin;
use warfront::plugins::audio::SoundPlugin;
use warfront::plugins::core::CorePlugin;
use warfront::plugins::fow::FogOfWarPlugin;
use warfront::plugins::hud::HudPlugin;
use warfront::plugins::minimap::MinimapPlugin;
use warfront::plugins::save::PersistencePlugin;
use warfront::plugins::worldmap::WorldMapPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(ImagePlugin::default_nearest()))
        .add_plugins(TilemapPlugin)
        .add_plugins(EguiPlugin)
        .add_plugins(CorePlugin)
        .add_plugins(WorldMapPlugin)
        .add_plugins(FogOfWarPlugin)
        .add_plugins(MinimapPlugin)
        .add_plugins(HudPlugin)
        .add_plugins(SoundPlugin)
        .add_plugins(PersistencePlugin)
        .run();
}
