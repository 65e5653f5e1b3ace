#[cfg(feature = "cli")]
mod args;
pub mod cli;
pub mod toml_config;

use crate::domain::model::OutputFormat;
use std::path::{Path, PathBuf};

/// `<dir>/<stem>.csv` -> `<dir>/<stem>.<kml|kmz>`, next to the input.
pub fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    input.with_extension(format.extension())
}

#[cfg(feature = "cli")]
pub use args::CliConfig;
