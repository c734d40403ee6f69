pub mod catalog_cmd;
pub mod config_cmd;
pub mod estimate_cmd;
pub mod input;
pub mod output;
pub mod renderer;
