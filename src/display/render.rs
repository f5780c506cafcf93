use std::fmt::Display;

use owo_colors::OwoColorize;

use super::layout::{Cell, Layout};
use super::{GridRenderer, RenderError};

/// Default width of one sub-column, in characters.
pub const DEFAULT_LABEL_WIDTH: usize = 24;

/// Marker drawn in rows covered by an event that started above.
pub const CONTINUATION_MARK: &str = "┆";

const SEPARATOR: &str = " │ ";

/// Truncate to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate_to(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else if max == 0 {
        String::new()
    } else {
        let kept: String = text.chars().take(max - 1).collect();
        format!("{}…", kept)
    }
}

/// Plain text table for terminals.
///
/// Every sub-column is `label_width` characters wide. A column widened for
/// concurrent events spans all of its sub-columns in the header.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    pub label_width: usize,
    pub colored: bool,
    pub title: Option<String>,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            label_width: DEFAULT_LABEL_WIDTH,
            colored: true,
            title: None,
        }
    }
}

impl TextRenderer {
    pub fn new(label_width: usize) -> Self {
        Self {
            label_width: label_width.max(1),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn plain(mut self) -> Self {
        self.colored = false;
        self
    }

    /// Width of a column spanning `sub_columns` sub-columns.
    fn column_width(&self, sub_columns: usize) -> usize {
        sub_columns * self.label_width + sub_columns.saturating_sub(1) * SEPARATOR.chars().count()
    }

    fn paint_header(&self, text: &str) -> String {
        if self.colored {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn render_cell(&self, cell: &Cell) -> String {
        let width = self.label_width;
        match cell {
            Cell::Empty => " ".repeat(width),
            Cell::Origin { label, .. } => {
                let text = format!("{:<width$}", truncate_to(label, width));
                if self.colored {
                    text.bright_green().to_string()
                } else {
                    text
                }
            }
            Cell::Continuation { .. } => {
                let text = format!("{:<width$}", CONTINUATION_MARK);
                if self.colored {
                    text.dimmed().to_string()
                } else {
                    text
                }
            }
        }
    }
}

impl GridRenderer for TextRenderer {
    fn render<R: Display, C: Display>(&self, layout: &Layout<R, C>) -> Result<String, RenderError> {
        let grid = &layout.grid;
        let mut output = String::new();

        if let Some(title) = &self.title {
            output.push_str(&self.paint_header(title));
            output.push('\n');
        }

        let row_labels: Vec<String> = grid.rows.iter().map(|r| r.to_string()).collect();
        let row_width = row_labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        // Header
        let mut header = " ".repeat(row_width);
        let mut rule = "─".repeat(row_width);
        for column in &grid.columns {
            let width = self.column_width(column.sub_columns);
            let key = truncate_to(&column.key.to_string(), width);
            header.push_str(SEPARATOR);
            header.push_str(&self.paint_header(&format!("{:<width$}", key)));
            rule.push_str("─┼─");
            rule.push_str(&"─".repeat(width));
        }
        output.push_str(header.trim_end());
        output.push('\n');
        output.push_str(&rule);
        output.push('\n');

        // Body
        for (label, cells) in row_labels.iter().zip(&grid.cells) {
            let mut line = format!("{:<row_width$}", label);
            for cell in cells {
                line.push_str(SEPARATOR);
                line.push_str(&self.render_cell(cell));
            }
            output.push_str(line.trim_end());
            output.push('\n');
        }

        if !layout.diagnostics.is_empty() {
            output.push('\n');
            for diagnostic in &layout.diagnostics {
                let tag = if self.colored {
                    "warning".yellow().bold().to_string()
                } else {
                    "warning".to_string()
                };
                output.push_str(&format!("{}: {}\n", tag, diagnostic));
            }
        }

        Ok(output)
    }
}
