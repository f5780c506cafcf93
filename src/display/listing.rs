//! Plain tables of text rows, for exam lists and value counts.

use minijinja::{context, AutoEscape, Environment};
use owo_colors::OwoColorize;

use super::RenderError;

const LISTING_TEMPLATE: &str = include_str!("../../templates/listing.html");

const GAP: &str = "  ";

/// A titled table with one header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub title: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Listing {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            title: None,
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, value) in row.iter().enumerate() {
                let len = value.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }

    /// Left-aligned columns separated by two spaces, with a rule under the header.
    pub fn render_text(&self, colored: bool) -> String {
        let widths = self.column_widths();
        let line = |values: &[String]| {
            let mut out = String::new();
            for (i, width) in widths.iter().enumerate() {
                if i > 0 {
                    out.push_str(GAP);
                }
                let value = values.get(i).map(String::as_str).unwrap_or("");
                out.push_str(&format!("{:<width$}", value));
            }
            out.trim_end().to_string()
        };

        let mut output = String::new();
        if let Some(title) = &self.title {
            if colored {
                output.push_str(&title.bold().to_string());
            } else {
                output.push_str(title);
            }
            output.push('\n');
        }

        let header = line(&self.headers);
        if colored {
            output.push_str(&header.bold().to_string());
        } else {
            output.push_str(&header);
        }
        output.push('\n');

        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        output.push_str(&rule.join(GAP));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&line(row));
            output.push('\n');
        }
        output
    }

    pub fn render_html(&self) -> Result<String, RenderError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_template("listing", LISTING_TEMPLATE)?;
        let template = env.get_template("listing")?;

        let mut output = template.render(context! {
            title => &self.title,
            headers => &self.headers,
            rows => &self.rows,
        })?;
        output.push('\n');
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Listing {
        let mut listing = Listing::new(["date", "time", "exam"]).with_title("Exams");
        listing.push_row(vec!["2026-01-12".into(), "09:00".into(), "Sem. 1 - Statics".into()]);
        listing.push_row(vec!["2026-01-14".into(), "12:00".into(), "R&D".into()]);
        listing
    }

    #[test]
    fn test_text_columns_are_aligned() {
        let out = sample().render_text(false);
        println!("\n{}", out);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Exams");
        assert_eq!(lines[1], "date        time   exam");
        assert_eq!(lines[2], "──────────  ─────  ────────────────");
        assert_eq!(lines[3], "2026-01-12  09:00  Sem. 1 - Statics");
        assert_eq!(lines[4], "2026-01-14  12:00  R&D");
    }

    #[test]
    fn test_html_rows_are_escaped() {
        let out = sample().render_html().unwrap();

        assert!(out.contains("<caption>Exams</caption>"));
        assert!(out.contains("<th>date</th><th>time</th><th>exam</th>"));
        assert!(out.contains("<td>R&amp;D</td>"));
        assert_eq!(out.matches("<tr>").count(), 3);
    }

    #[test]
    fn test_empty_listing_keeps_header() {
        let listing = Listing::new(["value", "count"]);
        assert!(listing.is_empty());
        assert_eq!(listing.render_text(false), "value  count\n─────  ─────\n");
    }
}
