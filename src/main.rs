use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roster_tools::dump;
use roster_tools::export::{self, RosterDocument};
use roster_tools::logging::init_logging;
use roster_tools::schema::EventSchema;
use roster_tools::timeslot::{TimeSlotDto, validate_timeslots};
use roster_tools::{ExcelParser, Result, RosterError};

fn main() {
    let cli = Cli::parse();
    let directive = if cli.verbose { "debug" } else { "info" };
    if let Err(error) = init_logging(directive) {
        eprintln!("warning: {error}");
    }

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    }
}

/// Returns `false` when the command completed but found problems.
fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::Parse(args) => execute_parse(args).map(|()| true),
        Command::Dump(args) => execute_dump(args).map(|()| true),
        Command::CheckTimeslots(args) => execute_check_timeslots(args),
    }
}

fn execute_parse(args: ParseArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(RosterError::MissingInput(args.input));
    }

    let schema = match &args.schema {
        Some(path) => EventSchema::from_path(path)?,
        None => EventSchema::embedded()?,
    };
    let parser = ExcelParser::new(schema)?;
    let workshops = parser.parse_path(&args.input)?;

    if let Some(path) = &args.workbook {
        export::write_roster_workbook(path, &workshops)?;
    }
    let document = RosterDocument::new(parser.schema(), workshops);
    export::write_roster_json(&args.output, &document)
}

fn execute_dump(args: DumpArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(RosterError::MissingInput(args.input));
    }
    dump::write_dump(&args.input, &args.output).map(|_| ())
}

fn execute_check_timeslots(args: CheckTimeslotsArgs) -> Result<bool> {
    if !args.input.exists() {
        return Err(RosterError::MissingInput(args.input));
    }
    let source = fs::read_to_string(&args.input)?;
    let timeslots: Vec<TimeSlotDto> = serde_json::from_str(&source)?;
    let result = validate_timeslots(&timeslots);

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result.is_valid())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Turn event registration workbooks into workshop rosters."
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a registration workbook into a JSON roster.
    Parse(ParseArgs),
    /// Summarise the sheets, headers, and a sample row of a workbook.
    Dump(DumpArgs),
    /// Check a JSON timeslot list for overlaps and unconfigured periods.
    CheckTimeslots(CheckTimeslotsArgs),
}

#[derive(clap::Args)]
struct ParseArgs {
    /// Registration workbook (xlsx).
    #[arg(long)]
    input: PathBuf,

    /// Event schema (JSON). Defaults to the bundled schema.
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Roster JSON output path.
    #[arg(long)]
    output: PathBuf,

    /// Optional flat roster workbook output path.
    #[arg(long)]
    workbook: Option<PathBuf>,
}

#[derive(clap::Args)]
struct DumpArgs {
    /// Workbook to inspect (xlsx).
    #[arg(long)]
    input: PathBuf,

    /// JSON output path.
    #[arg(long)]
    output: PathBuf,
}

#[derive(clap::Args)]
struct CheckTimeslotsArgs {
    /// JSON array of timeslots.
    #[arg(long)]
    input: PathBuf,
}
