// Run configuration: `.buildgate.yml`, command-line overrides and environment.

mod loader;
mod types;

pub use loader::{CONFIG_FILE, load};
pub use types::{
    Config, DEFAULT_THRESHOLD, Ecosystem, FileConfig, Overrides, THRESHOLD_ENV, parse_dir_list,
    resolve_threshold,
};
