use std::fmt::Display;

use minijinja::{context, AutoEscape, Environment};
use serde::Serialize;

use super::layout::{Cell, Layout};
use super::{GridRenderer, RenderError};

/// Built-in table template. Receives `title`, `columns`, `rows` and `diagnostics`.
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/grid.html");

#[derive(Debug, Serialize)]
struct ColumnView {
    key: String,
    span: usize,
}

#[derive(Debug, Serialize)]
struct CellView {
    label: String,
    rowspan: usize,
    empty: bool,
}

#[derive(Debug, Serialize)]
struct RowView {
    key: String,
    cells: Vec<CellView>,
}

/// HTML table with merged cells.
///
/// Continuation cells are left out entirely; the origin's `rowspan` covers
/// them. Output is always HTML-escaped, whatever the template is called.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    pub title: Option<String>,
    /// Replacement for [`DEFAULT_TEMPLATE`]
    pub template: Option<String>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_template(mut self, source: impl Into<String>) -> Self {
        self.template = Some(source.into());
        self
    }
}

fn row_views<R: Display, C>(layout: &Layout<R, C>) -> Vec<RowView> {
    layout
        .grid
        .rows
        .iter()
        .zip(&layout.grid.cells)
        .map(|(key, cells)| RowView {
            key: key.to_string(),
            cells: cells
                .iter()
                .filter_map(|cell| match cell {
                    Cell::Empty => Some(CellView {
                        label: String::new(),
                        rowspan: 1,
                        empty: true,
                    }),
                    Cell::Origin { label, span, .. } => Some(CellView {
                        label: label.clone(),
                        rowspan: *span,
                        empty: false,
                    }),
                    Cell::Continuation { .. } => None,
                })
                .collect(),
        })
        .collect()
}

impl GridRenderer for HtmlRenderer {
    fn render<R: Display, C: Display>(&self, layout: &Layout<R, C>) -> Result<String, RenderError> {
        let source = self.template.as_deref().unwrap_or(DEFAULT_TEMPLATE);

        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_template("grid", source)?;
        let template = env.get_template("grid")?;

        let columns: Vec<ColumnView> = layout
            .grid
            .columns
            .iter()
            .map(|c| ColumnView {
                key: c.key.to_string(),
                span: c.sub_columns,
            })
            .collect();
        let diagnostics: Vec<String> = layout.diagnostics.iter().map(|d| d.to_string()).collect();

        let mut output = template.render(context! {
            title => &self.title,
            columns => columns,
            rows => row_views(layout),
            diagnostics => diagnostics,
        })?;
        output.push('\n');
        Ok(output)
    }
}
