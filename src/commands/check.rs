//! Check command - reports what would be dropped or clipped.

use std::path::Path;

use crate::context::{exam_weeks, ExamFilter, LoadError, ScheduleContext, TimetableFilter};
use crate::display::{build_grid, Diagnostic};
use crate::error_fmt::AppError;

/// Outcome of a check: one summary line per sheet, then the warnings.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub lines: Vec<String>,
    pub warnings: Vec<String>,
}

impl CheckReport {
    fn sheet_summary(&mut self, sheet: &str, rows: usize, placed: usize, skipped: usize, diagnostics: &[Diagnostic]) {
        self.lines.push(format!(
            "{}: {} rows, {} placed, {} skipped, {} diagnostics",
            sheet,
            rows,
            placed,
            skipped,
            diagnostics.len()
        ));
        for diagnostic in diagnostics {
            self.warnings.push(format!("{}: {}", sheet, diagnostic));
        }
    }

    /// Summary lines, then warnings, or an ok line when there are none.
    pub fn render(&self, workbook: &Path) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&format!("{}\n", line));
        }
        for warning in &self.warnings {
            out.push_str(&format!("warning: {}\n", warning));
        }
        if self.warnings.is_empty() {
            out.push_str(&format!("ok: {} validated\n", workbook.display()));
        }
        out
    }
}

/// Normalize and lay out every known sheet, collecting the warnings.
///
/// Only unreadable workbooks, missing columns and bad axes are errors; a
/// sheet the workbook lacks is noted and skipped.
pub fn check_report(ctx: &ScheduleContext) -> Result<CheckReport, AppError> {
    let config = ctx.config();
    let workbook = ctx.workbook()?;
    let row_slots = config.row_slots();
    let mut report = CheckReport::default();

    let name = &config.sheets.timetable;
    match ctx.timetable(None, &TimetableFilter::default()) {
        Ok(normalized) => {
            let layout = build_grid(&normalized.events, &row_slots, &config.weekdays, config.tie_break)?;
            let rows = workbook.sheet(name).map(<[_]>::len).unwrap_or_default();
            for issue in &normalized.issues {
                report.warnings.push(format!("{}: {}", name, issue));
            }
            report.sheet_summary(name, rows, layout.placed_count(), normalized.issues.len(), &layout.diagnostics);
        }
        Err(LoadError::SheetNotFound { .. }) => report.lines.push(format!("{}: no such sheet, skipped", name)),
        Err(e) => return Err(e.into()),
    }

    let name = &config.sheets.exams;
    match ctx.exams(None, &ExamFilter::default()) {
        Ok(normalized) => {
            let mut placed = 0;
            let mut diagnostics = Vec::new();
            for week in exam_weeks(&normalized.events) {
                let layout = build_grid(&week.events, &row_slots, &week.days, config.tie_break)?;
                placed += layout.placed_count();
                diagnostics.extend(layout.diagnostics);
            }
            let rows = workbook.sheet(name).map(<[_]>::len).unwrap_or_default();
            for issue in &normalized.issues {
                report.warnings.push(format!("{}: {}", name, issue));
            }
            report.sheet_summary(name, rows, placed, normalized.issues.len(), &diagnostics);
        }
        Err(LoadError::SheetNotFound { .. }) => report.lines.push(format!("{}: no such sheet, skipped", name)),
        Err(e) => return Err(e.into()),
    }

    Ok(report)
}

pub fn check(ctx: &ScheduleContext) -> Result<(), AppError> {
    let report = check_report(ctx)?;
    print!("{}", report.render(ctx.path()));
    Ok(())
}
