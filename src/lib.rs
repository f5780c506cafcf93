pub mod commands;
pub mod context;
pub mod display;
pub mod document;
pub mod error_fmt;

// Re-export commonly used types for convenience
pub use context::{
    ExamFilter, GlobalConfig, LoadError, Normalized, ScheduleContext, SettingsError, SourceIssue,
    TimetableFilter, Workbook,
};
pub use display::{
    build_grid, Cell, ConfigurationError, Diagnostic, DiagnosticKind, Grid, GridColumn,
    GridRenderer, HtmlRenderer, Layout, OutputFormat, RenderError, ScheduledEvent, TextRenderer,
    TieBreak,
};
pub use document::DocumentError;
