//! Schedule data and its configuration.
//!
//! This module contains:
//! - `Workbook` - sheets of records read from a YAML workbook
//! - `GlobalConfig` - axis ranges, durations and ordering settings
//! - Normalization of timetable and exam rows into scheduled events
//! - `ScheduleContext` - the cached workbook used by the commands

mod normalize;
mod settings;
mod sheet;

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::NaiveDate;

pub use normalize::{
    exam_events, exam_label, exam_weeks, exams_by_date, timetable_events, timetable_label,
    ExamFilter, ExamWeek, Normalized, SourceIssue, TimetableFilter,
};
pub use settings::{GlobalConfig, SettingsError, SheetNames};
pub use sheet::{
    clean_text, parse_date, parse_duration, parse_hour, parse_semester, scalar_text, typed_row,
    value_counts, ExamRow, LoadError, Record, TimetableRow, Workbook, EXAM_COLUMNS,
    TIMETABLE_COLUMNS,
};

/// Internal state protected by RwLock.
#[derive(Default)]
struct ContextInner {
    workbook: Option<Arc<Workbook>>,
    version: u64,
}

/// A workbook on disk plus the settings used to read it.
///
/// The workbook is parsed on first use and kept until [`reload`] or
/// [`invalidate`] is called, so several grids can be built from one read.
///
/// [`reload`]: ScheduleContext::reload
/// [`invalidate`]: ScheduleContext::invalidate
pub struct ScheduleContext {
    inner: RwLock<ContextInner>,
    path: PathBuf,
    config: GlobalConfig,
}

impl std::fmt::Debug for ScheduleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleContext")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ScheduleContext {
    pub fn new(path: PathBuf, config: GlobalConfig) -> Self {
        Self {
            inner: RwLock::new(ContextInner::default()),
            path,
            config,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// Number of times the workbook has been read from disk.
    pub fn version(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .version
    }

    /// The parsed workbook, reading it from disk if nothing is cached.
    pub fn workbook(&self) -> Result<Arc<Workbook>, LoadError> {
        if let Some(workbook) = &self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .workbook
        {
            return Ok(Arc::clone(workbook));
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have loaded it while we waited for the lock
        if let Some(workbook) = &inner.workbook {
            return Ok(Arc::clone(workbook));
        }
        let workbook = self.read_from_disk(&mut inner)?;
        Ok(workbook)
    }

    /// Drop the cached workbook and read the file again.
    pub fn reload(&self) -> Result<Arc<Workbook>, LoadError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.workbook = None;
        self.read_from_disk(&mut inner)
    }

    /// Drop the cached workbook; the next access reads the file again.
    pub fn invalidate(&self) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .workbook = None;
    }

    fn read_from_disk(&self, inner: &mut ContextInner) -> Result<Arc<Workbook>, LoadError> {
        let workbook = Arc::new(Workbook::load(&self.path)?);
        inner.version += 1;
        log::debug!(
            "loaded {} (version {}, sheets: {})",
            self.path.display(),
            inner.version,
            workbook.sheet_names().join(", ")
        );
        inner.workbook = Some(Arc::clone(&workbook));
        Ok(workbook)
    }

    /// Timetable events from `sheet` (the configured timetable sheet if `None`).
    pub fn timetable(
        &self,
        sheet: Option<&str>,
        filter: &TimetableFilter,
    ) -> Result<Normalized<u32, String>, LoadError> {
        let workbook = self.workbook()?;
        let name = sheet.unwrap_or(&self.config.sheets.timetable);
        let rows = workbook.sheet_with_columns(name, TIMETABLE_COLUMNS)?;
        Ok(timetable_events(rows, filter, &self.config))
    }

    /// Exam events from `sheet` (the configured exam sheet if `None`).
    pub fn exams(
        &self,
        sheet: Option<&str>,
        filter: &ExamFilter,
    ) -> Result<Normalized<u32, NaiveDate>, LoadError> {
        let workbook = self.workbook()?;
        let name = sheet.unwrap_or(&self.config.sheets.exams);
        let rows = workbook.sheet_with_columns(name, EXAM_COLUMNS)?;
        Ok(exam_events(rows, filter, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const WORKBOOK: &str = r#"
sheets:
  timetable:
    - { course_id: CE101, course_name: Statics, class_name: Lab A, semester: 1, teaching_period: Winter, instructors: Smith, day: Monday, start_time: "09:00", duration: 2, room: A1, notes: "" }
  exams:
    - { course_id: CE101, course_name: Statics, semester: 1, instructor: Smith, exam_date: 2026-01-12, start_time: "09:00", room: A1, notes: "" }
"#;

    fn write_workbook(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("schedule.yml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_workbook_is_loaded_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_workbook(&temp_dir, WORKBOOK);
        let ctx = ScheduleContext::new(path, GlobalConfig::default());

        assert_eq!(ctx.version(), 0);
        let first = ctx.workbook().unwrap();
        let second = ctx.workbook().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(ctx.version(), 1);
    }

    #[test]
    fn test_reload_picks_up_changes() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_workbook(&temp_dir, WORKBOOK);
        let ctx = ScheduleContext::new(path.clone(), GlobalConfig::default());

        let filter = TimetableFilter {
            period: Some("Winter".to_string()),
            semester: None,
        };
        assert_eq!(ctx.timetable(None, &filter).unwrap().events.len(), 1);

        let changed = WORKBOOK.replace("duration: 2, room: A1, notes: \"\" }", "duration: 2, room: A1, notes: \"\" }\n    - { course_name: Geology, teaching_period: Winter, day: Tuesday, start_time: 10 }");
        std::fs::write(&path, changed).unwrap();

        // Still cached
        assert_eq!(ctx.timetable(None, &filter).unwrap().events.len(), 1);

        ctx.reload().unwrap();
        assert_eq!(ctx.version(), 2);
        assert_eq!(ctx.timetable(None, &filter).unwrap().events.len(), 2);
    }

    #[test]
    fn test_invalidate_reads_again_on_next_access() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_workbook(&temp_dir, WORKBOOK);
        let ctx = ScheduleContext::new(path, GlobalConfig::default());

        ctx.workbook().unwrap();
        ctx.invalidate();
        assert_eq!(ctx.version(), 1);
        ctx.workbook().unwrap();
        assert_eq!(ctx.version(), 2);
    }

    #[test]
    fn test_exams_from_configured_sheet() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_workbook(&temp_dir, &WORKBOOK.replace("  exams:", "  ExamsJan26:"));
        let mut config = GlobalConfig::default();
        config.sheets.exams = "ExamsJan26".to_string();
        let ctx = ScheduleContext::new(path, config);

        let exams = ctx.exams(None, &ExamFilter::default()).unwrap();
        assert_eq!(exams.events.len(), 1);
        assert_eq!(exams.events[0].label, "Sem. 1 - Statics - Smith");

        let err = ctx.exams(Some("exams"), &ExamFilter::default()).unwrap_err();
        assert!(matches!(err, LoadError::SheetNotFound { .. }));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = ScheduleContext::new(temp_dir.path().join("nope.yml"), GlobalConfig::default());

        assert!(matches!(ctx.workbook(), Err(LoadError::Io { .. })));
        assert_eq!(ctx.version(), 0);
    }
}
