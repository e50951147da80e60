pub mod audio;
pub mod core;
pub mod fow;
pub mod hud;
pub mod minimap;
pub mod save;
pub mod worldmap;
