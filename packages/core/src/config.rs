//! Configuration for the editor and collection engines
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables for debouncing, paging and timeline layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    /// Quiet window before an edited document is persisted
    pub save_debounce_ms: u64,

    /// Quiet window before a page rename is persisted
    pub title_debounce_ms: u64,

    /// Page size used when querying collection items
    pub item_page_size: usize,

    /// Timeline bar width per day of duration
    pub timeline_px_per_day: u32,

    /// Timeline bar width cap
    pub timeline_max_bar_px: u32,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            save_debounce_ms: 250,
            title_debounce_ms: 250,
            item_page_size: 100,
            timeline_px_per_day: 20,
            timeline_max_bar_px: 200,
        }
    }
}

impl WorkbenchConfig {
    /// Defaults overlaid with `WORKBENCH_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`, then validated
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        overlay(&lookup, "WORKBENCH_SAVE_DEBOUNCE_MS", &mut config.save_debounce_ms)?;
        overlay(&lookup, "WORKBENCH_TITLE_DEBOUNCE_MS", &mut config.title_debounce_ms)?;
        overlay(&lookup, "WORKBENCH_ITEM_PAGE_SIZE", &mut config.item_page_size)?;
        overlay(&lookup, "WORKBENCH_TIMELINE_PX_PER_DAY", &mut config.timeline_px_per_day)?;
        overlay(&lookup, "WORKBENCH_TIMELINE_MAX_BAR_PX", &mut config.timeline_max_bar_px)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.save_debounce_ms == 0 || self.title_debounce_ms == 0 {
            return Err(ConfigError::Invalid("debounce windows must be greater than 0".to_string()));
        }
        if self.item_page_size == 0 {
            return Err(ConfigError::Invalid("item_page_size must be greater than 0".to_string()));
        }
        if self.timeline_max_bar_px < self.timeline_px_per_day {
            return Err(ConfigError::Invalid(format!(
                "timeline_max_bar_px ({}) is smaller than timeline_px_per_day ({})",
                self.timeline_max_bar_px, self.timeline_px_per_day
            )));
        }
        Ok(())
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    pub fn title_debounce(&self) -> Duration {
        Duration::from_millis(self.title_debounce_ms)
    }
}

fn overlay<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(raw) = lookup(key) {
        *target = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
        })?;
    }
    Ok(())
}
