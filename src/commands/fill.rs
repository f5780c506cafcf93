//! Fill command - render a document template from one workbook row.

use std::collections::BTreeSet;
use std::path::PathBuf;

use owo_colors::OwoColorize;

use super::shared::{parse_key, write_output};
use crate::context::{scalar_text, ScheduleContext};
use crate::document::{fill_template, find_record, undeclared_variables};
use crate::error_fmt::{AppError, IoResultExt};

#[derive(Debug, Clone)]
pub struct FillArgs {
    pub sheet: String,
    /// Row selector as COLUMN=VALUE
    pub key: Option<String>,
    pub template: PathBuf,
    pub output: Option<PathBuf>,
}

fn read_template(args: &FillArgs) -> Result<String, AppError> {
    std::fs::read_to_string(&args.template)
        .with_context(&format!("failed to read template {}", args.template.display()))
}

/// Fill the template from the row selected by `--key`.
pub fn render_document(ctx: &ScheduleContext, args: &FillArgs) -> Result<String, AppError> {
    let Some(key) = args.key.as_deref() else {
        return Err(AppError::InvalidKey(String::new()));
    };
    let (column, value) = parse_key(key)?;

    let source = read_template(args)?;
    let workbook = ctx.workbook()?;
    let rows = workbook.sheet(&args.sheet)?;
    let record = find_record(rows, column, value)?;

    Ok(fill_template(&source, record)?)
}

/// Variables the template uses, each marked with whether the sheet has it.
pub fn template_variables(
    ctx: &ScheduleContext,
    args: &FillArgs,
) -> Result<Vec<(String, bool)>, AppError> {
    let source = read_template(args)?;
    let workbook = ctx.workbook()?;
    let rows = workbook.sheet(&args.sheet)?;

    let columns: BTreeSet<String> = rows
        .iter()
        .flat_map(|row| row.keys().filter_map(scalar_text))
        .collect();

    Ok(undeclared_variables(&source)?
        .into_iter()
        .map(|name| {
            let known = columns.contains(&name);
            (name, known)
        })
        .collect())
}

pub fn fill(ctx: &ScheduleContext, args: &FillArgs) -> Result<(), AppError> {
    let output = render_document(ctx, args)?;
    write_output(&output, args.output.as_deref())
}

/// Print the template's variables for `--list-vars`.
pub fn list_vars(ctx: &ScheduleContext, args: &FillArgs) -> Result<(), AppError> {
    for (name, known) in template_variables(ctx, args)? {
        if known {
            println!("{}", name);
        } else {
            println!("{} {}", name, "(not a column)".yellow());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GlobalConfig;
    use tempfile::TempDir;

    const WORKBOOK: &str = r#"
sheets:
  courses:
    - { course_id: CE101, course_name: Statics, instructor: Smith, room: null }
    - { course_id: CE201, course_name: Geology, instructor: Jones, room: C3 }
"#;

    fn setup(dir: &TempDir, template: &str) -> (ScheduleContext, FillArgs) {
        let workbook = dir.path().join("schedule.yml");
        std::fs::write(&workbook, WORKBOOK).unwrap();
        let template_path = dir.path().join("letter.txt");
        std::fs::write(&template_path, template).unwrap();

        let ctx = ScheduleContext::new(workbook, GlobalConfig::default());
        let args = FillArgs {
            sheet: "courses".to_string(),
            key: Some("course_id=CE201".to_string()),
            template: template_path,
            output: None,
        };
        (ctx, args)
    }

    #[test]
    fn test_render_document() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, args) = setup(&temp_dir, "Dear {{ instructor }}, {{ course_name }} is in {{ room }}.");

        let out = render_document(&ctx, &args).unwrap();
        assert_eq!(out, "Dear Jones, Geology is in C3.");
    }

    #[test]
    fn test_null_value_renders_empty() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, mut args) = setup(&temp_dir, "room=[{{ room }}]");
        args.key = Some("course_id=CE101".to_string());

        assert_eq!(render_document(&ctx, &args).unwrap(), "room=[]");
    }

    #[test]
    fn test_fill_writes_output() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, mut args) = setup(&temp_dir, "{{ course_name }}");
        let output = temp_dir.path().join("out.txt");
        args.output = Some(output.clone());

        fill(&ctx, &args).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "Geology");
    }

    #[test]
    fn test_missing_record_and_bad_key() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, mut args) = setup(&temp_dir, "{{ course_name }}");

        args.key = Some("course_id=XX".to_string());
        let err = render_document(&ctx, &args).unwrap_err();
        assert!(matches!(err, AppError::Document(_)));

        args.key = Some("course_id".to_string());
        let err = render_document(&ctx, &args).unwrap_err();
        assert!(matches!(err, AppError::InvalidKey(_)));
    }

    #[test]
    fn test_template_variables() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, args) = setup(&temp_dir, "{{ instructor }} {{ signature }} {{ course_id }}");

        let vars = template_variables(&ctx, &args).unwrap();
        assert_eq!(
            vars,
            vec![
                ("course_id".to_string(), true),
                ("instructor".to_string(), true),
                ("signature".to_string(), false),
            ]
        );
    }
}
