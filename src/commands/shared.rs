//! Shared utilities for commands: rendering, output and warnings.

use std::fmt::Display;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;

use crate::context::{GlobalConfig, SourceIssue};
use crate::display::{GridRenderer, HtmlRenderer, Layout, Listing, OutputFormat, TextRenderer};
use crate::error_fmt::{AppError, IoResultExt};

/// How a grid command presents its result.
#[derive(Debug, Clone, Default)]
pub struct GridOptions {
    pub format: OutputFormat,
    /// Replacement HTML template
    pub template: Option<PathBuf>,
    /// Write here instead of stdout
    pub output: Option<PathBuf>,
}

impl GridOptions {
    /// Reject option combinations that would be silently ignored.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.template.is_some() && self.format != OutputFormat::Html {
            return Err(AppError::TemplateNeedsHtml);
        }
        Ok(())
    }

    /// Colour is only used for text going straight to a terminal.
    fn colored(&self) -> bool {
        self.output.is_none() && std::io::stdout().is_terminal()
    }

    fn template_source(&self) -> Result<Option<String>, AppError> {
        self.template
            .as_deref()
            .map(|path| {
                std::fs::read_to_string(path)
                    .with_context(&format!("failed to read template {}", path.display()))
            })
            .transpose()
    }
}

/// Render one layout in the requested format.
pub fn render_layout<R: Display, C: Display>(
    layout: &Layout<R, C>,
    title: &str,
    opts: &GridOptions,
    config: &GlobalConfig,
) -> Result<String, AppError> {
    opts.validate()?;
    let output = match opts.format {
        OutputFormat::Text => {
            let mut renderer = TextRenderer::new(config.label_width).with_title(title);
            if !opts.colored() {
                renderer = renderer.plain();
            }
            renderer.render(layout)?
        }
        OutputFormat::Html => {
            let mut renderer = HtmlRenderer::new().with_title(title);
            if let Some(source) = opts.template_source()? {
                renderer = renderer.with_template(source);
            }
            renderer.render(layout)?
        }
    };
    Ok(output)
}

/// Render a plain table in the requested format. Templates do not apply.
pub fn render_listing(listing: &Listing, opts: &GridOptions) -> Result<String, AppError> {
    match opts.format {
        OutputFormat::Text => Ok(listing.render_text(opts.colored())),
        OutputFormat::Html => Ok(listing.render_html()?),
    }
}

fn stderr_colored() -> bool {
    std::io::stderr().is_terminal()
}

/// Write `content` to `output`, or print it when no file is given.
pub fn write_output(content: &str, output: Option<&Path>) -> Result<(), AppError> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(&format!("failed to write {}", path.display()))?;
            let shown = path.display().to_string();
            if stderr_colored() {
                eprintln!("wrote {}", shown.cyan());
            } else {
                eprintln!("wrote {}", shown);
            }
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// One warning line for a skipped source row.
pub fn issue_line(sheet: &str, issue: &SourceIssue, colored: bool) -> String {
    if colored {
        format!("{}: {}: {}", "warning".yellow().bold(), sheet, issue)
    } else {
        format!("warning: {}: {}", sheet, issue)
    }
}

/// Print skipped source rows to stderr.
pub fn print_issues(sheet: &str, issues: &[SourceIssue]) {
    let colored = stderr_colored();
    for issue in issues {
        eprintln!("{}", issue_line(sheet, issue, colored));
    }
}

/// Split a `COLUMN=VALUE` key into its parts.
pub fn parse_key(key: &str) -> Result<(&str, &str), AppError> {
    match key.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => Ok((column.trim(), value)),
        _ => Err(AppError::InvalidKey(key.to_string())),
    }
}
