pub mod components;
pub mod events;
pub mod plugins;
pub mod resources;
pub mod systems;
pub mod utils;
