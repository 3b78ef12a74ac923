//! Loading config, task batches and busy calendars from disk.

use std::path::Path;

use taskslot_core::error::{CoreError, Result};
use taskslot_core::{CalendarEvent, Config, TaskBatch, TaskDraft};

/// Config from `--config` when given (defaults if the file does not exist
/// yet), otherwise the user config. A file that exists but does not parse is
/// an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) if path.exists() => Config::load_from(path)?,
        Some(_) => Config::default(),
        None => Config::load()?,
    };
    Ok(config)
}

/// Persist to `--config` when given, otherwise to the user config.
pub fn save_config(config: &Config, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }
    Ok(())
}

/// Task drafts from a `.toml` file (`[[task]]` tables) or a JSON array.
pub fn load_drafts(path: &Path) -> Result<Vec<TaskDraft>> {
    let content = read(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        let batch: TaskBatch = toml::from_str(&content)?;
        Ok(batch.tasks)
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

/// Busy events from a JSON array.
pub fn load_busy(path: &Path) -> Result<Vec<CalendarEvent>> {
    let content = read(path)?;
    let events: Vec<CalendarEvent> = serde_json::from_str(&content)?;
    // Re-run the range check serde skipped.
    let events = events
        .into_iter()
        .map(|e| CalendarEvent::new(e.id, e.title, e.start_time, e.end_time))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(events)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| CoreError::read(path, e))
}
