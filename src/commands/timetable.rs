//! Timetable command - weekly grid for one teaching period.

use super::shared::{print_issues, render_layout, write_output, GridOptions};
use crate::context::{ScheduleContext, TimetableFilter};
use crate::display::build_grid;
use crate::error_fmt::AppError;

#[derive(Debug, Clone, Default)]
pub struct TimetableArgs {
    pub period: String,
    pub semester: Option<u32>,
    /// Sheet to read; the configured timetable sheet when `None`
    pub sheet: Option<String>,
    pub grid: GridOptions,
}

fn title(args: &TimetableArgs) -> String {
    match args.semester {
        Some(semester) => format!("{} timetable, semester {}", args.period, semester),
        None => format!("{} timetable", args.period),
    }
}

/// Build and render the timetable without writing it anywhere.
pub fn render_timetable(ctx: &ScheduleContext, args: &TimetableArgs) -> Result<String, AppError> {
    args.grid.validate()?;
    let config = ctx.config();
    let filter = TimetableFilter {
        period: Some(args.period.clone()),
        semester: args.semester,
    };
    let sheet = args.sheet.as_deref();
    let normalized = ctx.timetable(sheet, &filter)?;
    print_issues(sheet.unwrap_or(&config.sheets.timetable), &normalized.issues);

    let layout = build_grid(
        &normalized.events,
        &config.row_slots(),
        &config.weekdays,
        config.tie_break,
    )?;
    log::info!(
        "{} of {} timetable events placed",
        layout.placed_count(),
        normalized.events.len()
    );

    render_layout(&layout, &title(args), &args.grid, config)
}

/// Print or save the weekly timetable.
pub fn timetable(ctx: &ScheduleContext, args: &TimetableArgs) -> Result<(), AppError> {
    let output = render_timetable(ctx, args)?;
    write_output(&output, args.grid.output.as_deref())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::context::GlobalConfig;
    use crate::display::OutputFormat;
    use tempfile::TempDir;

    const WORKBOOK: &str = r#"
sheets:
  timetable:
    - { course_id: CE101, course_name: Statics, class_name: Lab A, semester: 1, teaching_period: Winter, instructors: Smith, day: Monday, start_time: "09:00", duration: 2, room: A1, notes: "" }
    - { course_id: CE102, course_name: Drawing, semester: 1, teaching_period: Winter, instructors: Lee, day: Monday, start_time: "09:00", duration: 1, room: B2, notes: "" }
    - { course_id: CE201, course_name: Geology, semester: 3, teaching_period: Winter, instructors: Jones, day: Tuesday, start_time: "10:00", duration: 1, room: C3, notes: "" }
    - { course_id: CE301, course_name: Optics, semester: 1, teaching_period: Spring, instructors: Jones, day: Monday, start_time: "12:00", duration: 1, room: C3, notes: "" }
    - { course_id: CE401, course_name: Late Lab, semester: 1, teaching_period: Winter, instructors: Jones, day: Friday, start_time: "20:00", duration: 3, room: C3, notes: "" }
"#;

    fn context(dir: &TempDir) -> ScheduleContext {
        let path = dir.path().join("schedule.yml");
        std::fs::write(&path, WORKBOOK).unwrap();
        let config = GlobalConfig {
            label_width: 30,
            ..Default::default()
        };
        ScheduleContext::new(path, config)
    }

    fn args(format: OutputFormat) -> TimetableArgs {
        TimetableArgs {
            period: "Winter".to_string(),
            semester: None,
            sheet: None,
            grid: GridOptions {
                format,
                template: None,
                output: Some(PathBuf::from("unused.txt")),
            },
        }
    }

    #[test]
    fn test_text_timetable() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context(&temp_dir);

        let out = render_timetable(&ctx, &args(OutputFormat::Text)).unwrap();
        println!("\n{}", out);

        assert!(out.starts_with("Winter timetable"));
        assert_eq!(out.matches("Statics - Lab A - Smith (A1)").count(), 1);
        assert!(out.contains("Drawing - Lee (B2)"));
        assert!(out.contains("Geology - Jones (C3)"));
        assert!(!out.contains("Optics"));
        assert!(out.contains("warning: 'Late Lab - Jones (C3)': clipped from 3 to 1 rows"));
    }

    #[test]
    fn test_html_timetable_with_semester() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context(&temp_dir);
        let mut args = args(OutputFormat::Html);
        args.semester = Some(1);

        let out = render_timetable(&ctx, &args).unwrap();

        assert!(out.contains("<caption>Winter timetable, semester 1</caption>"));
        assert!(out.contains(r#"<th colspan="2">Monday</th>"#));
        assert!(out.contains(r#"rowspan="2">Statics - Lab A - Smith (A1)</td>"#));
        assert!(!out.contains("Geology"));
    }

    #[test]
    fn test_custom_template_file() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context(&temp_dir);
        let template = temp_dir.path().join("days.html");
        std::fs::write(&template, "{% for c in columns %}{{ c.key }} {% endfor %}").unwrap();

        let mut args = args(OutputFormat::Html);
        args.grid.template = Some(template);
        let out = render_timetable(&ctx, &args).unwrap();

        assert_eq!(out, "Monday Tuesday Wednesday Thursday Friday \n");
    }

    #[test]
    fn test_timetable_written_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context(&temp_dir);
        let output = temp_dir.path().join("winter.txt");
        let mut args = args(OutputFormat::Text);
        args.grid.output = Some(output.clone());

        timetable(&ctx, &args).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.contains("Statics"));
        assert!(!written.contains('\x1b'));
    }

    #[test]
    fn test_unknown_sheet() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context(&temp_dir);
        let mut args = args(OutputFormat::Text);
        args.sheet = Some("Timetable2025".to_string());

        let err = render_timetable(&ctx, &args).unwrap_err();
        assert!(matches!(err, AppError::Load(_)));
    }
}
