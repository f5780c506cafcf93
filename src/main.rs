use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use timegrid::commands::{self, ExamsArgs, FillArgs, GridOptions, StatsArgs, TimetableArgs};
use timegrid::error_fmt::{AppError, SettingsResultExt};
use timegrid::{GlobalConfig, OutputFormat, ScheduleContext};

#[derive(Parser)]
#[command(name = "timegrid")]
#[command(about = "Weekly timetable and exam grids from schedule workbooks")]
struct Cli {
    /// Settings file
    #[arg(long, global = true, default_value = "timegrid.yml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

/// Output arguments shared by the grid commands
#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format (text, html)
    #[arg(long, short, default_value = "text")]
    format: OutputFormat,
    /// Write to a file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Weekly timetable for one teaching period
    Timetable {
        /// Workbook file (defaults to `workbook` in the settings file)
        workbook: Option<PathBuf>,
        /// Teaching period to show
        #[arg(long, short)]
        period: String,
        /// Only this semester
        #[arg(long, short)]
        semester: Option<u32>,
        /// Sheet to read instead of the configured one
        #[arg(long)]
        sheet: Option<String>,
        /// HTML template replacing the built-in table
        #[arg(long, short)]
        template: Option<PathBuf>,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Exam grids, one per week, or a single list
    Exams {
        /// Workbook file (defaults to `workbook` in the settings file)
        workbook: Option<PathBuf>,
        /// Semesters to include (comma-separated or repeat flag)
        #[arg(long, short, value_delimiter = ',')]
        semester: Vec<u32>,
        /// Only exams held by this instructor
        #[arg(long, short)]
        instructor: Option<String>,
        /// Sheet to read instead of the configured one
        #[arg(long)]
        sheet: Option<String>,
        /// List exams by date and time instead of weekly grids
        #[arg(long, conflicts_with = "template")]
        list: bool,
        /// HTML template replacing the built-in table
        #[arg(long, short)]
        template: Option<PathBuf>,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Fill a document template from one row
    Fill {
        /// Workbook file (defaults to `workbook` in the settings file)
        workbook: Option<PathBuf>,
        /// Sheet holding the row
        #[arg(long)]
        sheet: String,
        /// Row to use, as COLUMN=VALUE
        #[arg(long, short, required_unless_present = "list_vars")]
        key: Option<String>,
        /// Template file
        #[arg(long, short)]
        template: PathBuf,
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// List the variables the template uses and exit
        #[arg(long)]
        list_vars: bool,
    },
    /// Report rows and events that cannot be placed
    Check {
        /// Workbook file (defaults to `workbook` in the settings file)
        workbook: Option<PathBuf>,
    },
    /// Count the rows holding each value of a column
    Stats {
        /// Workbook file (defaults to `workbook` in the settings file)
        workbook: Option<PathBuf>,
        /// Sheet to count
        #[arg(long)]
        sheet: String,
        /// Column whose values are counted
        #[arg(long, short)]
        column: String,
        #[command(flatten)]
        out: OutputArgs,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli.config, cli.command) {
        eprint!("{}", e);
        std::process::exit(1);
    }
}

fn run(config_path: &Path, command: Commands) -> Result<(), AppError> {
    let config = GlobalConfig::load(config_path).with_path(config_path)?;

    match command {
        Commands::Timetable {
            workbook,
            period,
            semester,
            sheet,
            template,
            out,
        } => {
            let ctx = open(workbook, config)?;
            let args = TimetableArgs {
                period,
                semester,
                sheet,
                grid: grid_options(out, template),
            };
            commands::timetable(&ctx, &args)
        }
        Commands::Exams {
            workbook,
            semester,
            instructor,
            sheet,
            list,
            template,
            out,
        } => {
            let ctx = open(workbook, config)?;
            let args = ExamsArgs {
                semesters: semester,
                instructor,
                sheet,
                list,
                grid: grid_options(out, template),
            };
            commands::exams(&ctx, &args)
        }
        Commands::Fill {
            workbook,
            sheet,
            key,
            template,
            output,
            list_vars,
        } => {
            let ctx = open(workbook, config)?;
            let args = FillArgs {
                sheet,
                key,
                template,
                output,
            };
            if list_vars {
                commands::list_vars(&ctx, &args)
            } else {
                commands::fill(&ctx, &args)
            }
        }
        Commands::Check { workbook } => {
            let ctx = open(workbook, config)?;
            commands::check(&ctx)
        }
        Commands::Stats {
            workbook,
            sheet,
            column,
            out,
        } => {
            let ctx = open(workbook, config)?;
            let args = StatsArgs {
                sheet,
                column,
                out: grid_options(out, None),
            };
            commands::stats(&ctx, &args)
        }
    }
}

/// Context for the workbook given on the command line, or the configured one.
fn open(workbook: Option<PathBuf>, config: GlobalConfig) -> Result<ScheduleContext, AppError> {
    let path = workbook
        .or_else(|| config.workbook_path())
        .ok_or(AppError::NoWorkbook)?;
    Ok(ScheduleContext::new(path, config))
}

fn grid_options(out: OutputArgs, template: Option<PathBuf>) -> GridOptions {
    GridOptions {
        format: out.format,
        template,
        output: out.output,
    }
}
