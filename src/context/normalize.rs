//! Turn workbook rows into scheduled events.
//!
//! Rows that cannot be placed (no day, unreadable time or date) are skipped
//! and reported as [`SourceIssue`]s; the grid builder only ever sees
//! well-formed events.

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;

use chrono::{Datelike, Days, NaiveDate, Weekday};

use super::settings::GlobalConfig;
use super::sheet::{
    clean_text, parse_date, parse_duration, parse_hour, parse_semester, typed_row, ExamRow,
    Record, TimetableRow,
};
use crate::display::ScheduledEvent;

/// A source row that was left out, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIssue {
    /// 1-based row number within the sheet
    pub row: usize,
    pub reason: String,
}

impl fmt::Display for SourceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.reason)
    }
}

/// Events built from a sheet, plus the rows that had to be skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<R, C> {
    pub events: Vec<ScheduledEvent<R, C>>,
    pub issues: Vec<SourceIssue>,
}

impl<R, C> Default for Normalized<R, C> {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            issues: Vec::new(),
        }
    }
}

impl<R, C> Normalized<R, C> {
    fn skip(&mut self, row: usize, reason: impl Into<String>) {
        let issue = SourceIssue {
            row,
            reason: reason.into(),
        };
        log::warn!("skipping {}", issue);
        self.issues.push(issue);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimetableFilter {
    /// Teaching period to show (e.g. "Winter"); `None` keeps every period
    pub period: Option<String>,
    pub semester: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExamFilter {
    /// Semesters to keep; empty keeps all
    pub semesters: Vec<u32>,
    pub instructor: Option<String>,
}

fn span_of(hours: usize) -> NonZeroUsize {
    NonZeroUsize::new(hours).unwrap_or(NonZeroUsize::MIN)
}

/// Join the present parts of a label with " - ".
fn join_label<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> String {
    parts
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" - ")
}

/// Label for a timetable entry: "Course - Class - Instructors (Room)".
pub fn timetable_label(row: &TimetableRow) -> String {
    let course = row.course_name.as_deref().map(clean_text);
    let class = row.class_name.as_deref().map(clean_text);
    let instructors = row.instructors.as_deref().map(clean_text);
    let mut label = join_label([course.as_deref(), class.as_deref(), instructors.as_deref()]);
    if let Some(room) = row.room.as_deref().map(clean_text).filter(|r| !r.is_empty()) {
        if label.is_empty() {
            label = format!("({})", room);
        } else {
            label.push_str(&format!(" ({})", room));
        }
    }
    label
}

/// Label for an exam: "Sem. 3 - Course - Instructor".
pub fn exam_label(row: &ExamRow) -> String {
    let semester = row
        .semester
        .as_deref()
        .map(|s| match parse_semester(s) {
            Some(n) => format!("Sem. {}", n),
            None => format!("Sem. {}", clean_text(s)),
        });
    let course = row.course_name.as_deref().map(clean_text);
    let instructor = row.instructor.as_deref().map(clean_text);
    join_label([semester.as_deref(), course.as_deref(), instructor.as_deref()])
}

/// Build weekly timetable events: row key = start hour, column key = day name.
pub fn timetable_events(
    rows: &[Record],
    filter: &TimetableFilter,
    config: &GlobalConfig,
) -> Normalized<u32, String> {
    let mut out = Normalized::default();

    for (i, record) in rows.iter().enumerate() {
        let row_no = i + 1;
        let row: TimetableRow = match typed_row(record) {
            Ok(row) => row,
            Err(e) => {
                out.skip(row_no, format!("unreadable row: {}", e));
                continue;
            }
        };

        if filter
            .period
            .as_deref()
            .is_some_and(|period| row.teaching_period.as_deref() != Some(period))
        {
            continue;
        }
        if let Some(wanted) = filter.semester {
            match row.semester.as_deref().and_then(parse_semester) {
                Some(s) if s == wanted => {}
                Some(_) => continue,
                None => {
                    out.skip(row_no, "semester is missing or not a number");
                    continue;
                }
            }
        }

        let Some(day) = row.day.clone() else {
            out.skip(row_no, "day is missing");
            continue;
        };
        let Some(start) = row.start_time.as_deref() else {
            out.skip(row_no, "start_time is missing");
            continue;
        };
        let Some(hour) = parse_hour(start) else {
            out.skip(row_no, format!("start_time '{}' is not a time", start));
            continue;
        };
        let hours = match row.duration.as_deref() {
            None => config.default_duration_hours as usize,
            Some(d) => match parse_duration(d) {
                Some(h) => h,
                None => {
                    out.skip(row_no, format!("duration '{}' is not a number of hours", d));
                    continue;
                }
            },
        };

        out.events
            .push(ScheduledEvent::new(hour, day, span_of(hours), timetable_label(&row)));
    }

    out
}

/// Build exam events: row key = start hour, column key = exam date.
pub fn exam_events(
    rows: &[Record],
    filter: &ExamFilter,
    config: &GlobalConfig,
) -> Normalized<u32, NaiveDate> {
    let mut out = Normalized::default();
    let span = span_of(config.exam_duration_hours as usize);

    for (i, record) in rows.iter().enumerate() {
        let row_no = i + 1;
        let row: ExamRow = match typed_row(record) {
            Ok(row) => row,
            Err(e) => {
                out.skip(row_no, format!("unreadable row: {}", e));
                continue;
            }
        };

        if !filter.semesters.is_empty() {
            match row.semester.as_deref().and_then(parse_semester) {
                Some(s) if filter.semesters.contains(&s) => {}
                Some(_) => continue,
                None => {
                    out.skip(row_no, "semester is missing or not a number");
                    continue;
                }
            }
        }
        if filter
            .instructor
            .as_deref()
            .is_some_and(|instructor| row.instructor.as_deref() != Some(instructor))
        {
            continue;
        }

        // Rows without a date are placeholders for unscheduled exams
        let Some(date_text) = row.exam_date.as_deref() else {
            out.skip(row_no, "exam_date is missing");
            continue;
        };
        let Some(date) = parse_date(date_text) else {
            out.skip(row_no, format!("exam_date '{}' is not a date", date_text));
            continue;
        };
        let Some(start) = row.start_time.as_deref() else {
            out.skip(row_no, "start_time is missing");
            continue;
        };
        let Some(hour) = parse_hour(start) else {
            out.skip(row_no, format!("start_time '{}' is not a time", start));
            continue;
        };

        out.events
            .push(ScheduledEvent::new(hour, date, span, exam_label(&row)));
    }

    out
}

/// Exams in date order, then by start hour. Exams in the same slot keep
/// their sheet order.
pub fn exams_by_date(events: &[ScheduledEvent<u32, NaiveDate>]) -> Vec<&ScheduledEvent<u32, NaiveDate>> {
    let mut sorted: Vec<_> = events.iter().collect();
    sorted.sort_by_key(|e| (e.column_key, e.row_key));
    sorted
}

/// Exams falling in one ISO week.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamWeek {
    pub year: i32,
    pub week: u32,
    /// Monday to Friday of the week
    pub days: Vec<NaiveDate>,
    pub events: Vec<ScheduledEvent<u32, NaiveDate>>,
}

impl ExamWeek {
    pub fn title(&self) -> String {
        match (self.days.first(), self.days.last()) {
            (Some(first), Some(last)) => format!(
                "Week {} ({} to {})",
                self.week,
                first.format("%d/%m/%Y"),
                last.format("%d/%m/%Y")
            ),
            _ => format!("Week {}", self.week),
        }
    }
}

/// Group exam events by ISO week, in date order.
///
/// Each week's column axis is Monday to Friday. Weekend exams stay with their
/// week and show up as unknown-column diagnostics when the grid is built.
pub fn exam_weeks(events: &[ScheduledEvent<u32, NaiveDate>]) -> Vec<ExamWeek> {
    let mut weeks: BTreeMap<(i32, u32), Vec<ScheduledEvent<u32, NaiveDate>>> = BTreeMap::new();
    for event in events {
        let iso = event.column_key.iso_week();
        weeks
            .entry((iso.year(), iso.week()))
            .or_default()
            .push(event.clone());
    }

    weeks
        .into_iter()
        .filter_map(|((year, week), events)| {
            let monday = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)?;
            let days = (0..5)
                .filter_map(|offset| monday.checked_add_days(Days::new(offset)))
                .collect();
            Some(ExamWeek {
                year,
                week,
                days,
                events,
            })
        })
        .collect()
}
