//! File logging. The terminal belongs to the game screen, so log lines go to a file.

use anyhow::{Context, Result};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::Path;

/// Install a global logger writing to `path`, truncating any previous log.
///
/// Fails if the file cannot be created or a logger is already installed.
pub fn init_file_logger(path: &Path, level: LevelFilter) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    WriteLogger::init(level, config, file).context("Failed to initialize logger")?;
    Ok(())
}
