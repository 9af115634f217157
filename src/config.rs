//! Dashboard configuration.
//!
//! Read from an optional JSON file, then overridden from the environment.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::availability::MAX_WINDOW_MINUTES;
use crate::calendar::HourSlots;
use crate::error::{Result, ValidationError};

pub const APP_NAME: &str = "healthdesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const ENV_DATA_DIR: &str = "HEALTHDESK_DATA_DIR";
pub const ENV_LOG: &str = "HEALTHDESK_LOG";

pub fn default_log_filter() -> String {
    format!("{}=info", APP_NAME)
}

/// Opening hours of one facility, as whole hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub open_hour: u32,
    pub close_hour: u32,
}

impl OperatingHours {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.open_hour >= self.close_hour || self.close_hour > 24 {
            return Err(ValidationError::InvalidHourRange {
                start: self.open_hour,
                end: self.close_hour,
            });
        }
        Ok(())
    }

    pub fn slots(&self) -> std::result::Result<HourSlots, ValidationError> {
        HourSlots::hourly(self.open_hour, self.close_hour)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub day_start_hour: u32,
    pub day_end_hour: u32,
    pub facilities: BTreeMap<String, OperatingHours>,
    pub data_dir: PathBuf,
    pub log_filter: String,
    pub availability_minutes: i64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            day_start_hour: 8,
            day_end_hour: 18,
            facilities: BTreeMap::new(),
            data_dir: PathBuf::from("healthdesk-data"),
            log_filter: default_log_filter(),
            availability_minutes: 60,
        }
    }
}

impl DashboardConfig {
    /// Load from `path` if given, apply environment overrides, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => DashboardConfig::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override fields from a variable lookup (normally the process env).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log_filter = filter;
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        self.default_hours().validate()?;
        for hours in self.facilities.values() {
            hours.validate()?;
        }
        if !(1..=MAX_WINDOW_MINUTES).contains(&self.availability_minutes) {
            return Err(ValidationError::InvalidValue {
                field: "availability_minutes",
                value: self.availability_minutes.to_string(),
            });
        }
        Ok(())
    }

    pub fn default_hours(&self) -> OperatingHours {
        OperatingHours {
            open_hour: self.day_start_hour,
            close_hour: self.day_end_hour,
        }
    }

    /// Grid hours for a facility, falling back to the default range.
    pub fn hours_for(&self, facility: Option<&str>) -> OperatingHours {
        facility
            .and_then(|name| self.facilities.get(name))
            .copied()
            .unwrap_or_else(|| self.default_hours())
    }

    pub fn slots_for(
        &self,
        facility: Option<&str>,
    ) -> std::result::Result<HourSlots, ValidationError> {
        self.hours_for(facility).slots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_eight_to_six() {
        let config = DashboardConfig::default();
        let slots = config.slots_for(None).unwrap();
        assert_eq!(slots.row_count(), 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let json = r#"{
            "day_start_hour": 7,
            "facilities": {"Night Clinic": {"open_hour": 18, "close_hour": 24}}
        }"#;
        let config: DashboardConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.day_start_hour, 7);
        assert_eq!(config.day_end_hour, 18);
        assert_eq!(config.hours_for(Some("Night Clinic")).open_hour, 18);
        assert_eq!(config.hours_for(Some("Unknown")).open_hour, 7);
        assert_eq!(config.slots_for(Some("Night Clinic")).unwrap().row_count(), 6);
    }

    #[test]
    fn environment_overrides_apply() {
        let mut config = DashboardConfig::default();
        config.apply_overrides(|name| match name {
            ENV_DATA_DIR => Some("/var/lib/healthdesk".to_string()),
            ENV_LOG => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/healthdesk"));
        assert_eq!(config.log_filter, default_log_filter());
    }

    #[test]
    fn rejects_inverted_facility_hours() {
        let mut config = DashboardConfig::default();
        config.facilities.insert(
            "Broken".to_string(),
            OperatingHours {
                open_hour: 17,
                close_hour: 9,
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn availability_minutes_must_fit_one_window() {
        let mut config = DashboardConfig::default();
        for bad in [0, -5, MAX_WINDOW_MINUTES + 1, i64::MAX] {
            config.availability_minutes = bad;
            assert!(config.validate().is_err(), "{} minutes accepted", bad);
        }
        config.availability_minutes = MAX_WINDOW_MINUTES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"day_end_hour": 20}"#).unwrap();
        let config = DashboardConfig::load(Some(&path)).unwrap();
        assert_eq!(config.day_end_hour, 20);
    }

    #[test]
    fn app_name_is_healthdesk() {
        assert_eq!(APP_NAME, "healthdesk");
    }
}
