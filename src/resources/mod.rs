pub mod cli;
pub mod display;
pub mod exploration;
pub mod fow_surface;
pub mod game_settings;
pub mod map_data;
pub mod tileset;
pub mod world_clock;

pub use cli::*;
pub use display::*;
pub use exploration::*;
pub use fow_surface::*;
pub use game_settings::*;
pub use map_data::*;
pub use tileset::*;
pub use world_clock::*;
