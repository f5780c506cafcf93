//! Fill a text template from one workbook row.
//!
//! Templates use minijinja syntax and see the row's columns as top-level
//! variables (`{{ course_name }}`). Blank cells and columns the row lacks
//! both render as empty text.

use std::collections::BTreeMap;

use minijinja::{Environment, UndefinedBehavior};
use thiserror::Error;

use crate::context::{scalar_text, Record};

const TEMPLATE_NAME: &str = "document";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("no row where {column} = '{value}'")]
    RecordNotFound { column: String, value: String },
}

/// Column name to display text, with blanks as "".
fn record_values(record: &Record) -> BTreeMap<String, String> {
    record
        .iter()
        .filter_map(|(key, value)| {
            let key = scalar_text(key)?;
            Some((key, scalar_text(value).unwrap_or_default()))
        })
        .collect()
}

fn environment(source: &str) -> Result<Environment<'_>, DocumentError> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Lenient);
    env.add_template(TEMPLATE_NAME, source)?;
    Ok(env)
}

/// Render `source` with the values of `record`.
pub fn fill_template(source: &str, record: &Record) -> Result<String, DocumentError> {
    let env = environment(source)?;
    let template = env.get_template(TEMPLATE_NAME)?;
    Ok(template.render(record_values(record))?)
}

/// Variables the template reads, sorted by name.
pub fn undeclared_variables(source: &str) -> Result<Vec<String>, DocumentError> {
    let env = environment(source)?;
    let template = env.get_template(TEMPLATE_NAME)?;
    let mut names: Vec<String> = template.undeclared_variables(false).into_iter().collect();
    names.sort();
    Ok(names)
}

/// First row whose `key_column` equals `key_value`, both sides trimmed.
pub fn find_record<'a>(
    rows: &'a [Record],
    key_column: &str,
    key_value: &str,
) -> Result<&'a Record, DocumentError> {
    let wanted = key_value.trim();
    rows.iter()
        .find(|row| {
            row.get(key_column)
                .and_then(scalar_text)
                .is_some_and(|v| v == wanted)
        })
        .ok_or_else(|| DocumentError::RecordNotFound {
            column: key_column.to_string(),
            value: wanted.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Workbook;

    fn rows() -> Vec<Record> {
        let wb = Workbook::parse(
            r#"
sheets:
  courses:
    - { course_id: CE101, course_name: Statics, instructor: Smith, notes: null }
    - { course_id: 202, course_name: Geology, instructor: " Jones " }
"#,
        )
        .unwrap();
        wb.sheets["courses"].clone()
    }

    #[test]
    fn test_fill_template() {
        let rows = rows();
        let out = fill_template("{{ course_id }}: {{ course_name }} ({{ instructor }})", &rows[0]).unwrap();
        assert_eq!(out, "CE101: Statics (Smith)");
    }

    #[test]
    fn test_blank_and_missing_values_render_empty() {
        let rows = rows();
        let out = fill_template("[{{ notes }}][{{ room }}]", &rows[0]).unwrap();
        assert_eq!(out, "[][]");
    }

    #[test]
    fn test_values_are_not_escaped() {
        let rows = rows();
        let out = fill_template("{{ course_name }} & <b>{{ instructor }}</b>", &rows[1]).unwrap();
        assert_eq!(out, "Geology & <b>Jones</b>");
    }

    #[test]
    fn test_syntax_error() {
        let rows = rows();
        let err = fill_template("{% if %}", &rows[0]).unwrap_err();
        assert!(matches!(err, DocumentError::Template(_)));
    }

    #[test]
    fn test_undeclared_variables() {
        let vars = undeclared_variables(
            "{{ room }} {{ course_name }}{% for x in items %}{{ x }}{% endfor %}{% set y = 1 %}{{ y }}",
        )
        .unwrap();
        assert_eq!(vars, vec!["course_name", "items", "room"]);
    }

    #[test]
    fn test_find_record() {
        let rows = rows();
        let found = find_record(&rows, "course_id", " 202 ").unwrap();
        assert_eq!(found.get("course_name").and_then(scalar_text).as_deref(), Some("Geology"));

        let found = find_record(&rows, "instructor", "Jones").unwrap();
        assert_eq!(found.get("course_id").and_then(scalar_text).as_deref(), Some("202"));

        let err = find_record(&rows, "course_id", "XX9").unwrap_err();
        assert_eq!(err.to_string(), "no row where course_id = 'XX9'");
    }
}
