//! CLI command implementations.
//!
//! Each command is implemented in its own submodule and reads the workbook
//! through a shared ScheduleContext.

mod check;
mod exams;
mod fill;
pub mod shared;
mod stats;
mod timetable;

pub use check::{check, check_report, CheckReport};
pub use exams::{exam_listing, exams, render_exams, ExamsArgs};
pub use fill::{fill, list_vars, render_document, template_variables, FillArgs};
pub use shared::GridOptions;
pub use stats::{render_stats, stats, StatsArgs};
pub use timetable::{render_timetable, timetable, TimetableArgs};
