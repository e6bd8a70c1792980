use serde::{Deserialize, Serialize};

use super::store::PresentationContext;

/// Configuration from window.toml. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Ticks to wait after the host reports its contracts before trusting them
    #[serde(default = "default_settle_ticks")]
    pub settle_ticks: u32,
    /// Seconds between timer refreshes in `cw watch`
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    #[serde(default)]
    pub context: PresentationContext,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            settle_ticks: default_settle_ticks(),
            refresh_interval_secs: default_refresh_interval(),
            context: PresentationContext::default(),
        }
    }
}

fn default_settle_ticks() -> u32 {
    15
}

fn default_refresh_interval() -> u64 {
    5
}

/// Which day/year lengths countdowns are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarKind {
    /// 6-hour days, 426-day years
    #[default]
    Kerbin,
    /// 24-hour days, 365-day years
    Earth,
}

impl CalendarKind {
    pub fn day_seconds(self) -> f64 {
        match self {
            CalendarKind::Kerbin => 6.0 * 3600.0,
            CalendarKind::Earth => 24.0 * 3600.0,
        }
    }

    pub fn year_days(self) -> f64 {
        match self {
            CalendarKind::Kerbin => 426.0,
            CalendarKind::Earth => 365.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default)]
    pub kind: CalendarKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Countdowns at or above this many seconds are not flagged as urgent
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold_secs: f64,
    /// Deepest parameter level rendered
    #[serde(default = "default_max_depth")]
    pub max_parameter_depth: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            warning_threshold_secs: default_warning_threshold(),
            max_parameter_depth: default_max_depth(),
        }
    }
}

fn default_warning_threshold() -> f64 {
    2_160_000.0
}

fn default_max_depth() -> usize {
    crate::model::parameter::MAX_DISPLAY_DEPTH
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Host snapshot, relative to the working directory
    #[serde(default = "default_snapshot_path")]
    pub snapshot: String,
    /// Persisted list state, relative to the working directory
    #[serde(default = "default_state_path")]
    pub state: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            snapshot: default_snapshot_path(),
            state: default_state_path(),
        }
    }
}

fn default_snapshot_path() -> String {
    "contracts.json".to_string()
}

fn default_state_path() -> String {
    ".window-state.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "warn".to_string()
}
