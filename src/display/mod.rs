pub mod html;
pub mod layout;
pub mod listing;
pub mod render;

use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

// Re-export types for convenience
pub use html::HtmlRenderer;
pub use layout::{
    build_grid, debug_render_grid, Cell, ConfigurationError, Diagnostic, DiagnosticKind, Grid,
    GridColumn, Layout, ScheduledEvent, TieBreak,
};
pub use listing::Listing;
pub use render::{truncate_to, TextRenderer, CONTINUATION_MARK, DEFAULT_LABEL_WIDTH};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// A consumer that turns a finished layout into displayable output.
pub trait GridRenderer {
    fn render<R: Display, C: Display>(&self, layout: &Layout<R, C>) -> Result<String, RenderError>;
}

/// Output format selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "html" => Ok(OutputFormat::Html),
            _ => Err(format!("invalid format '{}', must be one of: text, html", s)),
        }
    }
}
