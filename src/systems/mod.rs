pub mod fow;
pub mod fow_render;
pub mod minimap;
pub mod movement;
pub mod visibility;
pub mod world_tick;

pub use fow::*;
pub use fow_render::*;
pub use minimap::*;
pub use movement::*;
pub use visibility::*;
pub use world_tick::*;
