pub mod grid;
pub mod procgen;
