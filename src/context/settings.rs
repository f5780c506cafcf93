//! Global settings for grid building.
//!
//! The settings file (`timegrid.yml` by default) controls the hour range of
//! the time axis, the weekday columns, default durations and how concurrent
//! events are ordered. Every field is optional.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::display::{TieBreak, DEFAULT_LABEL_WIDTH};

/// Sheet names looked up in the workbook.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetNames {
    pub timetable: String,
    pub exams: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            timetable: "timetable".to_string(),
            exams: "exams".to_string(),
        }
    }
}

/// Global configuration loaded from `timegrid.yml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// First hour on the time axis. Default: 8.
    pub day_start: u32,

    /// Hour the time axis stops at (exclusive). Default: 21.
    pub day_end: u32,

    /// Column order for weekly timetables, matched against the `day` field.
    pub weekdays: Vec<String>,

    /// Hours a timetable row covers when it has no duration. Default: 1.
    pub default_duration_hours: u32,

    /// Hours every exam covers. Default: 2.
    pub exam_duration_hours: u32,

    /// How events starting in the same slot are ordered.
    pub tie_break: TieBreak,

    /// Width of one sub-column in text output.
    pub label_width: usize,

    /// Workbook used when none is given on the command line. `~` is expanded.
    pub workbook: Option<String>,

    pub sheets: SheetNames,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            day_start: 8,
            day_end: 21,
            weekdays: ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_duration_hours: 1,
            exam_duration_hours: 2,
            tie_break: TieBreak::default(),
            label_width: DEFAULT_LABEL_WIDTH,
            workbook: None,
            sheets: SheetNames::default(),
        }
    }
}

/// Errors that can occur when loading or validating settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("day_end ({end}) must be after day_start ({start}) and at most 24")]
    InvalidHours { start: u32, end: u32 },

    #[error("weekdays must list at least one day")]
    NoWeekdays,

    #[error("weekday '{0}' is listed more than once")]
    DuplicateWeekday(String),

    #[error("{field} must be at least 1")]
    ZeroDuration { field: &'static str },
}

impl GlobalConfig {
    /// Load settings from a file path.
    ///
    /// Returns the default config if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let config = match std::fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Self::default(),
            Ok(content) => serde_yaml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(SettingsError::Io(e)),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.day_end <= self.day_start || self.day_end > 24 {
            return Err(SettingsError::InvalidHours {
                start: self.day_start,
                end: self.day_end,
            });
        }
        if self.weekdays.is_empty() {
            return Err(SettingsError::NoWeekdays);
        }
        for (i, day) in self.weekdays.iter().enumerate() {
            if self.weekdays[..i].contains(day) {
                return Err(SettingsError::DuplicateWeekday(day.clone()));
            }
        }
        if self.default_duration_hours == 0 {
            return Err(SettingsError::ZeroDuration {
                field: "default_duration_hours",
            });
        }
        if self.exam_duration_hours == 0 {
            return Err(SettingsError::ZeroDuration {
                field: "exam_duration_hours",
            });
        }
        Ok(())
    }

    /// Hourly row slots from `day_start` up to, not including, `day_end`.
    pub fn row_slots(&self) -> Vec<u32> {
        (self.day_start..self.day_end).collect()
    }

    /// The configured default workbook with `~` expanded.
    pub fn workbook_path(&self) -> Option<PathBuf> {
        self.workbook
            .as_deref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.yml");

        let config = GlobalConfig::load(&path).unwrap();
        assert_eq!(config, GlobalConfig::default());
        assert_eq!(config.row_slots().first(), Some(&8));
        assert_eq!(config.row_slots().last(), Some(&20));
    }

    #[test]
    fn test_load_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("timegrid.yml");

        std::fs::write(
            &path,
            "day_start: 9\nday_end: 13\nweekdays: [Δευτέρα, Τρίτη]\ntie_break: label\nsheets:\n  exams: ExamsJan26\n",
        )
        .unwrap();

        let config = GlobalConfig::load(&path).unwrap();
        assert_eq!(config.row_slots(), vec![9, 10, 11, 12]);
        assert_eq!(config.weekdays, vec!["Δευτέρα", "Τρίτη"]);
        assert_eq!(config.tie_break, TieBreak::Label);
        assert_eq!(config.sheets.exams, "ExamsJan26");
        assert_eq!(config.sheets.timetable, "timetable");
        assert_eq!(config.exam_duration_hours, 2);
    }

    #[test]
    fn test_load_empty_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("timegrid.yml");

        std::fs::write(&path, "").unwrap();

        let config = GlobalConfig::load(&path).unwrap();
        assert_eq!(config, GlobalConfig::default());
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("timegrid.yml");

        std::fs::write(&path, "unknown_field: value\n").unwrap();

        let err = GlobalConfig::load(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_validate_hour_range() {
        let config = GlobalConfig {
            day_start: 12,
            day_end: 12,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SettingsError::InvalidHours { start: 12, end: 12 })
        ));

        let config = GlobalConfig {
            day_end: 25,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_weekdays() {
        let config = GlobalConfig {
            weekdays: vec![],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SettingsError::NoWeekdays)));

        let config = GlobalConfig {
            weekdays: vec!["Monday".to_string(), "Monday".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SettingsError::DuplicateWeekday(day)) if day == "Monday"
        ));
    }

    #[test]
    fn test_validate_zero_duration() {
        let config = GlobalConfig {
            exam_duration_hours: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SettingsError::ZeroDuration { field: "exam_duration_hours" })
        ));
    }

    #[test]
    fn test_workbook_path_expands_tilde() {
        let config = GlobalConfig {
            workbook: Some("~/schedules/2025-2026.yml".to_string()),
            ..Default::default()
        };
        let path = config.workbook_path().unwrap();
        assert!(path.ends_with("schedules/2025-2026.yml"));
        assert!(!path.to_string_lossy().starts_with('~') || std::env::var_os("HOME").is_none());
    }
}
