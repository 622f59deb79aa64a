// External process execution: spawn, capture, wait.

pub mod run;
pub mod types;

pub use run::run;
pub use types::{CommandSpec, ProcessOutput};
