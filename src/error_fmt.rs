use std::fmt;
use std::io;
use std::path::Path;

use owo_colors::OwoColorize;

use crate::context::{LoadError, SettingsError};
use crate::display::{ConfigurationError, RenderError};
use crate::document::DocumentError;

/// Application error with context for actionable error messages.
#[derive(Debug)]
pub enum AppError {
    /// IO error with context
    Io { context: String, source: io::Error },
    /// Settings file could not be read or is invalid
    Settings { path: String, source: SettingsError },
    /// Workbook could not be read, or a sheet is unusable
    Load(LoadError),
    /// Grid axes rejected by the builder
    Configuration(ConfigurationError),
    /// Template failed to render a grid
    Render(RenderError),
    /// Document template or record lookup failed
    Document(DocumentError),
    /// `--key` was not of the form COLUMN=VALUE
    InvalidKey(String),
    /// No workbook on the command line or in the settings file
    NoWorkbook,
    /// `--template` given for output that is not an HTML grid
    TemplateNeedsHtml,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io { context, source } => {
                write!(f, "{}", format_cli_error(&format!("{}: {}", context, source)))
            }
            AppError::Settings { path, source } => {
                write!(f, "{}", format_settings_error(source, path))
            }
            AppError::Load(e) => write!(f, "{}", format_load_error(e)),
            AppError::Configuration(e) => write!(f, "{}", format_configuration_error(e)),
            AppError::Render(e) => write!(f, "{}", format_render_error(e)),
            AppError::Document(e) => write!(f, "{}", format_document_error(e)),
            AppError::InvalidKey(key) => write!(f, "{}", format_invalid_key(key)),
            AppError::NoWorkbook => write!(f, "{}", format_no_workbook()),
            AppError::TemplateNeedsHtml => write!(f, "{}", format_template_needs_html()),
        }
    }
}

impl std::error::Error for AppError {}

/// Extension trait to add context to IO results.
pub trait IoResultExt<T> {
    fn with_context(self, context: &str) -> Result<T, AppError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn with_context(self, context: &str) -> Result<T, AppError> {
        self.map_err(|e| AppError::Io {
            context: context.to_string(),
            source: e,
        })
    }
}

/// Extension trait to add the settings file path to settings results.
pub trait SettingsResultExt<T> {
    fn with_path(self, path: &Path) -> Result<T, AppError>;
}

impl<T> SettingsResultExt<T> for Result<T, SettingsError> {
    fn with_path(self, path: &Path) -> Result<T, AppError> {
        self.map_err(|e| AppError::Settings {
            path: path.display().to_string(),
            source: e,
        })
    }
}

// ============================================================================
// Formatting functions (internal implementation)
// ============================================================================

fn error_prefix() -> String {
    format!("{}: ", "error".red().bold())
}

fn format_cli_error(message: &str) -> String {
    format!("{}{}\n", error_prefix(), message)
}

fn format_settings_error(error: &SettingsError, path: &str) -> String {
    let mut out = error_prefix();

    out.push_str(&format!("failed to load {}\n", path.cyan()));
    out.push_str(&format!("  {} {}\n", "•".red(), error));
    out.push('\n');
    out.push_str(&format!("  {}:\n", "To fix this".bold()));
    match error {
        SettingsError::Io(_) => {
            out.push_str("    Check that the file is readable, or pass another one with --config\n");
        }
        SettingsError::Parse(_) => {
            out.push_str("    Known fields: day_start, day_end, weekdays, default_duration_hours,\n");
            out.push_str("    exam_duration_hours, tie_break (insertion | label), label_width,\n");
            out.push_str("    workbook, sheets.timetable, sheets.exams\n");
        }
        SettingsError::InvalidHours { .. } => {
            out.push_str(&format!(
                "    Use an hour range such as {}\n",
                "day_start: 8, day_end: 21".cyan()
            ));
        }
        SettingsError::NoWeekdays | SettingsError::DuplicateWeekday(_) => {
            out.push_str(&format!(
                "    List each column day once, e.g. {}\n",
                "weekdays: [Monday, Tuesday, Wednesday, Thursday, Friday]".cyan()
            ));
        }
        SettingsError::ZeroDuration { field } => {
            out.push_str(&format!("    Set {} to 1 or more\n", field.cyan()));
        }
    }

    out
}

fn format_load_error(error: &LoadError) -> String {
    let mut out = error_prefix();

    match error {
        LoadError::Io { path, source } => {
            out.push_str(&format!(
                "cannot read workbook {}\n",
                path.display().to_string().cyan()
            ));
            out.push_str(&format!("  {}\n", source.to_string().dimmed()));
            if source.kind() == io::ErrorKind::NotFound {
                out.push('\n');
                out.push_str(&format!("  {}:\n", "To fix this".bold()));
                out.push_str("    Check the path, or set `workbook:` in the settings file\n");
            }
        }
        LoadError::Parse { path, source } => {
            out.push_str(&format!(
                "invalid workbook {}\n",
                path.display().to_string().cyan()
            ));
            out.push('\n');
            out.push_str(&format!("  {}\n", source.to_string().dimmed()));
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str("    A workbook is a `sheets:` map from sheet name to a list of rows:\n");
            out.push('\n');
            out.push_str(&format!("      {}\n", "sheets:".dimmed()));
            out.push_str(&format!("      {}\n", "  timetable:".dimmed()));
            out.push_str(&format!(
                "      {}\n",
                "    - { course_name: Statics, day: Monday, start_time: \"09:00\" }".dimmed()
            ));
        }
        LoadError::SheetNotFound { name, available } => {
            out.push_str(&format!("sheet '{}' not found\n", name.yellow()));
            out.push('\n');
            if available.is_empty() {
                out.push_str(&format!("  {}\n", "The workbook has no sheets.".dimmed()));
            } else {
                out.push_str(&format!(
                    "  {} {}\n",
                    "Available sheets:".dimmed(),
                    available.join(", ")
                ));
            }
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str(&format!(
                "    Pick a sheet with {}, or set {} in the settings file\n",
                "--sheet <NAME>".cyan(),
                "sheets:".cyan()
            ));
        }
        LoadError::MissingColumns { sheet, columns } => {
            out.push_str(&format!(
                "sheet '{}' is missing columns\n",
                sheet.yellow()
            ));
            for column in columns {
                out.push_str(&format!("  {} {}\n", "•".red(), column));
            }
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str("    Add the columns to at least one row (blank values are fine)\n");
        }
    }

    out
}

fn format_configuration_error(error: &ConfigurationError) -> String {
    let mut out = error_prefix();

    out.push_str(&format!("cannot build grid: {}\n", error));
    out.push('\n');
    out.push_str(&format!("  {}:\n", "To fix this".bold()));
    match error {
        ConfigurationError::EmptyRows => {
            out.push_str("    Set day_end after day_start in the settings file\n");
        }
        ConfigurationError::EmptyColumns => {
            out.push_str("    List at least one day under weekdays in the settings file\n");
        }
        ConfigurationError::DuplicateRow(_) | ConfigurationError::DuplicateColumn(_) => {
            out.push_str("    Remove the repeated entry from the settings file\n");
        }
    }

    out
}

fn format_render_error(error: &RenderError) -> String {
    let mut out = error_prefix();

    out.push_str("failed to render grid\n");
    out.push_str(&format!("  {} {}\n", "•".red(), error));
    out.push('\n');
    out.push_str(&format!("  {}:\n", "To fix this".bold()));
    out.push_str(&format!(
        "    Check the template passed with {}, or drop it to use the built-in table\n",
        "--template".cyan()
    ));

    out
}

fn format_document_error(error: &DocumentError) -> String {
    let mut out = error_prefix();

    match error {
        DocumentError::Template(e) => {
            out.push_str("failed to fill document template\n");
            out.push_str(&format!("  {} {}\n", "•".red(), e));
        }
        DocumentError::RecordNotFound { column, value } => {
            out.push_str(&format!(
                "no row where {} = '{}'\n",
                column.cyan(),
                value.yellow()
            ));
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str("    Check the key value and the --sheet the row lives in\n");
        }
    }

    out
}

fn format_invalid_key(key: &str) -> String {
    let mut out = error_prefix();

    out.push_str(&format!("invalid key '{}'\n", key.yellow()));
    out.push('\n');
    out.push_str(&format!("  {}:\n", "To fix this".bold()));
    out.push_str(&format!(
        "    Give the key as COLUMN=VALUE, e.g. {}\n",
        "--key course_id=CE101".cyan()
    ));

    out
}

fn format_no_workbook() -> String {
    let mut out = error_prefix();

    out.push_str("no workbook given\n");
    out.push('\n');
    out.push_str(&format!("  {}:\n", "To fix this".bold()));
    out.push_str(&format!(
        "    1. Pass one on the command line: {}\n",
        "timegrid timetable schedule.yml --period Winter".cyan()
    ));
    out.push_str(&format!(
        "    2. Or set it in the settings file: {}\n",
        "workbook: ~/schedules/schedule.yml".cyan()
    ));

    out
}

fn format_template_needs_html() -> String {
    let mut out = error_prefix();

    out.push_str("--template only applies to HTML grids\n");
    out.push('\n');
    out.push_str(&format!("  {}:\n", "To fix this".bold()));
    out.push_str(&format!(
        "    Add {}, or drop {} to use the built-in text table\n",
        "--format html".cyan(),
        "--template".cyan()
    ));

    out
}

impl From<LoadError> for AppError {
    fn from(e: LoadError) -> Self {
        AppError::Load(e)
    }
}

impl From<ConfigurationError> for AppError {
    fn from(e: ConfigurationError) -> Self {
        AppError::Configuration(e)
    }
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        AppError::Render(e)
    }
}

impl From<DocumentError> for AppError {
    fn from(e: DocumentError) -> Self {
        AppError::Document(e)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn strip_ansi(s: &str) -> String {
        let re = regex::Regex::new(r"\x1b\[[0-9;]*m").unwrap();
        re.replace_all(s, "").to_string()
    }

    #[test]
    fn test_format_sheet_not_found() {
        let err = AppError::Load(LoadError::SheetNotFound {
            name: "exams".to_string(),
            available: vec!["ExamsJan26".to_string(), "timetable".to_string()],
        });
        let stripped = strip_ansi(&err.to_string());

        assert!(stripped.contains("error:"));
        assert!(stripped.contains("sheet 'exams' not found"));
        assert!(stripped.contains("Available sheets: ExamsJan26, timetable"));
        assert!(stripped.contains("To fix this"));
        assert!(stripped.contains("--sheet <NAME>"));
    }

    #[test]
    fn test_format_missing_columns() {
        let err = AppError::Load(LoadError::MissingColumns {
            sheet: "timetable".to_string(),
            columns: vec!["day".to_string(), "start_time".to_string()],
        });
        let stripped = strip_ansi(&err.to_string());

        assert!(stripped.contains("sheet 'timetable' is missing columns"));
        assert!(stripped.contains("• day"));
        assert!(stripped.contains("• start_time"));
    }

    #[test]
    fn test_format_missing_workbook_file() {
        let err: AppError = LoadError::Io {
            path: PathBuf::from("schedule.yml"),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file"),
        }
        .into();
        let stripped = strip_ansi(&err.to_string());

        assert!(stripped.contains("cannot read workbook schedule.yml"));
        assert!(stripped.contains("workbook:"));
    }

    #[test]
    fn test_format_settings_error() {
        let err: Result<(), SettingsError> = Err(SettingsError::ZeroDuration {
            field: "exam_duration_hours",
        });
        let err = err.with_path(Path::new("timegrid.yml")).unwrap_err();
        let stripped = strip_ansi(&err.to_string());

        assert!(stripped.starts_with("error: failed to load timegrid.yml"));
        assert!(stripped.contains("exam_duration_hours must be at least 1"));
        assert!(stripped.contains("Set exam_duration_hours to 1 or more"));
    }

    #[test]
    fn test_format_configuration_error() {
        let err: AppError = ConfigurationError::EmptyColumns.into();
        let stripped = strip_ansi(&err.to_string());

        assert!(stripped.contains("cannot build grid: a grid needs at least one column"));
        assert!(stripped.contains("weekdays"));
    }

    #[test]
    fn test_format_invalid_key() {
        let stripped = strip_ansi(&AppError::InvalidKey("course_id".to_string()).to_string());

        assert!(stripped.contains("invalid key 'course_id'"));
        assert!(stripped.contains("COLUMN=VALUE"));
    }

    #[test]
    fn test_io_context() {
        let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        let err = result.with_context("failed to write out.html").unwrap_err();
        let stripped = strip_ansi(&err.to_string());

        assert_eq!(stripped, "error: failed to write out.html: denied\n");
    }

    #[test]
    fn test_format_template_needs_html() {
        let stripped = strip_ansi(&AppError::TemplateNeedsHtml.to_string());

        assert!(stripped.starts_with("error: --template only applies to HTML grids"));
        assert!(stripped.contains("Add --format html"));
    }
}
