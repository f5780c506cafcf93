//! Stats command - how many rows hold each value of a column.

use super::shared::{render_listing, write_output, GridOptions};
use crate::context::{value_counts, ScheduleContext};
use crate::display::Listing;
use crate::error_fmt::AppError;

/// Shown for blank cells.
const BLANK: &str = "(blank)";

#[derive(Debug, Clone, Default)]
pub struct StatsArgs {
    pub sheet: String,
    pub column: String,
    /// Format and output file; templates do not apply
    pub out: GridOptions,
}

pub fn render_stats(ctx: &ScheduleContext, args: &StatsArgs) -> Result<String, AppError> {
    if args.out.template.is_some() {
        return Err(AppError::TemplateNeedsHtml);
    }
    let workbook = ctx.workbook()?;
    let rows = workbook.sheet_with_columns(&args.sheet, &[args.column.as_str()])?;

    let mut listing = Listing::new([args.column.as_str(), "count"])
        .with_title(format!("{}: {} rows", args.sheet, rows.len()));
    for (value, count) in value_counts(rows, &args.column) {
        listing.push_row(vec![
            value.unwrap_or_else(|| BLANK.to_string()),
            count.to_string(),
        ]);
    }

    render_listing(&listing, &args.out)
}

/// Print or save the value counts.
pub fn stats(ctx: &ScheduleContext, args: &StatsArgs) -> Result<(), AppError> {
    let output = render_stats(ctx, args)?;
    write_output(&output, args.out.output.as_deref())
}
