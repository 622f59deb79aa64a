use std::path::Path;

use anyhow::{Context, Result};

use super::types::FileConfig;

pub const CONFIG_FILE: &str = ".buildgate.yml";

/// Load `.buildgate.yml` from the given directory.
///
/// A missing file yields the defaults. A file that exists but cannot be read
/// or parsed is an error.
pub fn load(dir: &Path) -> Result<FileConfig> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    let config: FileConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(config)
}
