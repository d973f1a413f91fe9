pub mod config_loader;
pub mod parse;

pub use config_loader::*;
