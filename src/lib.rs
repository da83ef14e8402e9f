pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod executor;
pub mod factory;
pub mod registry;
pub mod ui;

pub use error::{Result, VersionBumperError};
