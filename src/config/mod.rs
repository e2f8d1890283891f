// Configuration loading

mod settings;

use std::path::Path;

use anyhow::{Context, Result};

pub use settings::{CustomFieldSettings, FieldDefaults, FormSettings, DEFAULT_FORM_TEMPLATE};

/// Load settings from a YAML file, or the defaults when no path is given
pub fn load_settings(path: Option<&Path>) -> Result<FormSettings> {
    let Some(path) = path else {
        return Ok(FormSettings::default());
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    let settings = serde_yaml::from_str(&raw)
        .with_context(|| format!("Invalid settings file {}", path.display()))?;

    tracing::info!(path = %path.display(), "loaded form settings");
    Ok(settings)
}
