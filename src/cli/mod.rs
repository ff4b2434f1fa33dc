pub mod cli;
pub mod display;

pub use cli::{Config, ConfigError, read_source_file};
pub use display::{format_coloring, format_liveness, format_saves};
