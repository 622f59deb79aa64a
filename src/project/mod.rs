mod detect;
mod dirs;
mod types;

pub use detect::{ESLINT_CONFIGS, detect, detect_ecosystem};
pub use dirs::{DENYLIST, NODE_SOURCE_DIRS, PYTHON_SOURCE_DIRS, is_denied, resolve_source_dirs};
pub use types::{ProjectShape, TestTool};
