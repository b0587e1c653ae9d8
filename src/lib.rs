pub mod character_controller;
pub mod constants;
pub mod game_controller;
pub mod geom;
pub mod input;
pub mod level;
pub mod level_loader;
pub mod mask;
pub mod resolver;
pub mod trail;
