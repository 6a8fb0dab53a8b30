use std::{fs, fs::OpenOptions, sync::Mutex};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
};

/// Sends `tracing` output to the log file; the terminal belongs to the form.
pub fn init(config: &AppConfig) -> Result<()> {
    let path = config.log_file();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "buy={level},engine={level}",
            level = config.log_level
        ))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| AppError::Logging(err.to_string()))?;

    tracing::debug!(path = %path.display(), "logging initialized");
    Ok(())
}
