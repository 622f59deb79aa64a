pub mod artifacts;
pub mod config;
pub mod coverage;
pub mod pipeline;
pub mod process;
pub mod project;
pub mod slow_tests;
pub mod style;
pub mod telemetry;
