use std::path::PathBuf;

use crate::config::Ecosystem;

/// Which test runner the project uses. Decided once by [`super::detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestTool {
    None,
    Vitest,
    Jest,
    /// The manifest's own `test` script, wrapped with `c8` for coverage.
    GenericWithCoverage,
    Pytest,
}

impl TestTool {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestTool::None => "none",
            TestTool::Vitest => "vitest",
            TestTool::Jest => "jest",
            TestTool::GenericWithCoverage => "c8",
            TestTool::Pytest => "pytest",
        }
    }
}

/// What the detector found in the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectShape {
    pub ecosystem: Ecosystem,
    pub type_config: Option<PathBuf>,
    pub lint_config: Option<PathBuf>,
    pub test_tool: TestTool,
    pub has_playwright: bool,
    /// Launcher prefix for project-local tools, e.g. `["npx"]`.
    pub package_runner: Vec<String>,
    /// Directories (relative to the root) that format and lint steps target.
    pub source_dirs: Vec<String>,
}

impl ProjectShape {
    pub fn has_type_config(&self) -> bool {
        self.type_config.is_some()
    }

    pub fn has_lint_config(&self) -> bool {
        self.lint_config.is_some()
    }
}
