//! Schedule workbook: named sheets of loosely typed rows.
//!
//! A workbook is a YAML file exported from the department's spreadsheets:
//!
//! ```yaml
//! sheets:
//!   timetable:
//!     - course_id: CE101
//!       course_name: Statics
//!       semester: 1
//!       teaching_period: Winter
//!       day: Monday
//!       start_time: "09:00"
//!       duration: 2
//! ```
//!
//! Cell values are whatever the spreadsheet held, so numbers, strings and
//! blanks are all accepted and read back as trimmed text.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// One raw row, column name to cell value.
pub type Record = Mapping;

/// Columns a timetable sheet must have.
pub const TIMETABLE_COLUMNS: &[&str] = &[
    "course_id",
    "course_name",
    "class_name",
    "semester",
    "teaching_period",
    "instructors",
    "day",
    "start_time",
    "duration",
    "room",
    "notes",
];

/// Columns an exam sheet must have.
pub const EXAM_COLUMNS: &[&str] = &[
    "course_id",
    "course_name",
    "semester",
    "instructor",
    "exam_date",
    "start_time",
    "room",
    "notes",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("sheet '{name}' not found")]
    SheetNotFound { name: String, available: Vec<String> },

    #[error("sheet '{sheet}' is missing columns: {}", columns.join(", "))]
    MissingColumns { sheet: String, columns: Vec<String> },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Workbook {
    #[serde(default)]
    pub sheets: BTreeMap<String, Vec<Record>>,
}

impl Workbook {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.keys().cloned().collect()
    }

    /// Rows of a sheet, or `SheetNotFound` listing what is available.
    pub fn sheet(&self, name: &str) -> Result<&[Record], LoadError> {
        self.sheets
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| LoadError::SheetNotFound {
                name: name.to_string(),
                available: self.sheet_names(),
            })
    }

    /// Rows of a sheet, checked to carry every column in `required`.
    ///
    /// A column counts as present when at least one row has it, since
    /// exported rows drop keys for blank cells.
    pub fn sheet_with_columns(&self, name: &str, required: &[&str]) -> Result<&[Record], LoadError> {
        let rows = self.sheet(name)?;
        if rows.is_empty() {
            return Ok(rows);
        }
        let missing: Vec<String> = required
            .iter()
            .filter(|col| !rows.iter().any(|row| row.contains_key(**col)))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns {
                sheet: name.to_string(),
                columns: missing,
            });
        }
        Ok(rows)
    }
}

/// Render a scalar cell as trimmed text. Blanks, nulls and nested values are `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_text))
}

/// Clean free text for display: no line breaks, quotes or backslashes.
pub fn clean_text(value: &str) -> String {
    value
        .replace(['\n', '\r'], " ")
        .replace(['"', '\'', '\\'], "")
        .trim()
        .to_string()
}

/// Parse an hour from "9", "09:00", "9:30:00" or "9.0". Minutes are dropped.
pub fn parse_hour(value: &str) -> Option<u32> {
    let head = value.trim().split(':').next()?;
    parse_whole_number(head).filter(|h| *h < 24)
}

/// Parse a duration in hours, rounding partial hours up. Zero becomes 1.
pub fn parse_duration(value: &str) -> Option<usize> {
    let hours = value.trim().parse::<f64>().ok()?;
    if !hours.is_finite() || hours < 0.0 {
        return None;
    }
    Some((hours.ceil() as usize).max(1))
}

/// Parse a date in ISO form, or day-first with slashes or dashes.
/// A trailing time part ("2026-01-12 00:00:00") is ignored.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.trim().split([' ', 'T']).next()?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Parse a semester number, accepting "3" or "3.0".
pub fn parse_semester(value: &str) -> Option<u32> {
    parse_whole_number(value)
}

/// Spreadsheets hand integers back as floats, so "3.0" is accepted as 3.
fn parse_whole_number(value: &str) -> Option<u32> {
    let value = value.trim();
    value.parse::<u32>().ok().or_else(|| {
        let f = value.parse::<f64>().ok()?;
        (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX)).then_some(f as u32)
    })
}

/// A row of the weekly timetable sheet.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimetableRow {
    #[serde(deserialize_with = "text")]
    pub course_id: Option<String>,
    #[serde(deserialize_with = "text")]
    pub course_name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub class_name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub semester: Option<String>,
    #[serde(deserialize_with = "text")]
    pub teaching_period: Option<String>,
    #[serde(deserialize_with = "text")]
    pub instructors: Option<String>,
    #[serde(deserialize_with = "text")]
    pub day: Option<String>,
    #[serde(deserialize_with = "text")]
    pub start_time: Option<String>,
    #[serde(deserialize_with = "text")]
    pub duration: Option<String>,
    #[serde(deserialize_with = "text")]
    pub room: Option<String>,
    #[serde(deserialize_with = "text")]
    pub notes: Option<String>,
}

/// A row of the exam schedule sheet.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExamRow {
    #[serde(deserialize_with = "text")]
    pub course_id: Option<String>,
    #[serde(deserialize_with = "text")]
    pub course_name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub semester: Option<String>,
    #[serde(deserialize_with = "text")]
    pub instructor: Option<String>,
    #[serde(deserialize_with = "text")]
    pub exam_date: Option<String>,
    #[serde(deserialize_with = "text")]
    pub start_time: Option<String>,
    #[serde(deserialize_with = "text")]
    pub room: Option<String>,
    #[serde(deserialize_with = "text")]
    pub notes: Option<String>,
}

/// Read a raw record as a typed row. Unknown columns are ignored.
pub fn typed_row<T: serde::de::DeserializeOwned>(record: &Record) -> Result<T, serde_yaml::Error> {
    serde_yaml::from_value(Value::Mapping(record.clone()))
}

/// Distinct values of `column` and how many rows hold each.
///
/// Most common first, ties in value order. Blank cells are counted under
/// `None`, which sorts after every value with the same count.
pub fn value_counts(rows: &[Record], column: &str) -> Vec<(Option<String>, usize)> {
    let mut counts: BTreeMap<Option<String>, usize> = BTreeMap::new();
    for row in rows {
        let value = row.get(column).and_then(scalar_text);
        *counts.entry(value).or_default() += 1;
    }

    let mut counts: Vec<(Option<String>, usize)> = counts.into_iter().collect();
    counts.sort_by(|(a, a_count), (b, b_count)| {
        b_count
            .cmp(a_count)
            .then_with(|| a.is_none().cmp(&b.is_none()))
            .then_with(|| a.cmp(b))
    });
    counts
}
