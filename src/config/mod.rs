//! Configuration
//!
//! [`ConfigLoader`] merges defaults, config files and `AGENTX_*` variables;
//! CLI flags are applied on top by the `run` command.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
