pub mod archive;
pub mod boundary;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod github;
pub mod install;
pub mod logging;
pub mod manifest;
pub mod process;
pub mod sync;
pub mod ui;
pub mod version;

pub use error::{Result, TaggerError};
