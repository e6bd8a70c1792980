use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::WindowConfig;

pub const CONFIG_FILE: &str = "window.toml";

/// Error type for reading window.toml
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse window.toml: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Read `window.toml` from `dir`. A missing file yields the defaults.
pub fn read_config(dir: &Path) -> Result<WindowConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(WindowConfig::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::CalendarKind;
    use crate::model::store::PresentationContext;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = read_config(tmp.path()).unwrap();
        assert_eq!(config.session.settle_ticks, 15);
        assert_eq!(config.session.refresh_interval_secs, 5);
        assert_eq!(config.calendar.kind, CalendarKind::Kerbin);
        assert_eq!(config.display.warning_threshold_secs, 2_160_000.0);
        assert_eq!(config.display.max_parameter_depth, 4);
        assert_eq!(config.paths.snapshot, "contracts.json");
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"[calendar]
kind = "earth"

[session]
context = "editor"
"#,
        )
        .unwrap();

        let config = read_config(tmp.path()).unwrap();
        assert_eq!(config.calendar.kind, CalendarKind::Earth);
        assert_eq!(config.session.context, PresentationContext::Editor);
        assert_eq!(config.session.settle_ticks, 15);
        assert_eq!(config.paths.state, ".window-state.json");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[calendar\nkind = ").unwrap();
        assert!(matches!(read_config(tmp.path()), Err(ConfigError::ParseError(_))));
    }
}
