//! Exams command - weekly exam grids, or one chronological list.

use chrono::NaiveDate;

use super::shared::{print_issues, render_layout, render_listing, write_output, GridOptions};
use crate::context::{exam_weeks, exams_by_date, ExamFilter, ScheduleContext};
use crate::display::{build_grid, Listing, OutputFormat, ScheduledEvent};
use crate::error_fmt::AppError;

#[derive(Debug, Clone, Default)]
pub struct ExamsArgs {
    /// Semesters to include; all when empty
    pub semesters: Vec<u32>,
    pub instructor: Option<String>,
    /// Sheet to read; the configured exam sheet when `None`
    pub sheet: Option<String>,
    /// One row per exam in date order instead of weekly grids
    pub list: bool,
    pub grid: GridOptions,
}

fn list_title(filter: &ExamFilter) -> String {
    let mut title = "Exams".to_string();
    if !filter.semesters.is_empty() {
        let semesters: Vec<String> = filter.semesters.iter().map(u32::to_string).collect();
        title.push_str(&format!(", semester {}", semesters.join(", ")));
    }
    if let Some(instructor) = &filter.instructor {
        title.push_str(&format!(", {}", instructor));
    }
    title
}

/// Exams as a chronological table: date, weekday, start time and label.
pub fn exam_listing(events: &[ScheduledEvent<u32, NaiveDate>], title: &str) -> Listing {
    let mut listing = Listing::new(["date", "day", "time", "exam"]).with_title(title);
    for event in exams_by_date(events) {
        listing.push_row(vec![
            event.column_key.format("%Y-%m-%d").to_string(),
            event.column_key.format("%a").to_string(),
            format!("{:02}:00", event.row_key),
            event.label.clone(),
        ]);
    }
    listing
}

/// Build and render every exam week, or the exam list, in date order.
///
/// Returns `None` when no exams match the filters.
pub fn render_exams(ctx: &ScheduleContext, args: &ExamsArgs) -> Result<Option<String>, AppError> {
    args.grid.validate()?;
    if args.list && args.grid.template.is_some() {
        return Err(AppError::TemplateNeedsHtml);
    }
    let config = ctx.config();
    let filter = ExamFilter {
        semesters: args.semesters.clone(),
        instructor: args.instructor.clone(),
    };
    let sheet = args.sheet.as_deref();
    let normalized = ctx.exams(sheet, &filter)?;
    print_issues(sheet.unwrap_or(&config.sheets.exams), &normalized.issues);

    if args.list {
        if normalized.events.is_empty() {
            return Ok(None);
        }
        let listing = exam_listing(&normalized.events, &list_title(&filter));
        return render_listing(&listing, &args.grid).map(Some);
    }

    let weeks = exam_weeks(&normalized.events);
    if weeks.is_empty() {
        return Ok(None);
    }

    let row_slots = config.row_slots();
    let mut pages = Vec::with_capacity(weeks.len());
    for week in &weeks {
        let layout = build_grid(&week.events, &row_slots, &week.days, config.tie_break)?;
        log::info!(
            "week {}/{}: {} of {} exams placed",
            week.week,
            week.year,
            layout.placed_count(),
            week.events.len()
        );
        pages.push(render_layout(&layout, &week.title(), &args.grid, config)?);
    }

    let separator = match args.grid.format {
        OutputFormat::Text => "\n",
        OutputFormat::Html => "",
    };
    Ok(Some(pages.join(separator)))
}

/// Print or save the exam weeks.
pub fn exams(ctx: &ScheduleContext, args: &ExamsArgs) -> Result<(), AppError> {
    match render_exams(ctx, args)? {
        Some(output) => write_output(&output, args.grid.output.as_deref()),
        None => {
            println!("No exams found");
            Ok(())
        }
    }
}
