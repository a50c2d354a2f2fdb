pub mod agents;
pub mod classify;
pub mod config;
pub mod run;
