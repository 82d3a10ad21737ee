pub mod config;
pub mod error;
pub mod game;
pub mod models;
pub mod utils;

pub use config::{GameDirs, HearthConfig};
pub use error::{Error, Result};
