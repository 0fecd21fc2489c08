use std::fs;
use std::path::PathBuf;

use autodiag_tools::flatten::build_workbook;
use autodiag_tools::io::excel_write;
use autodiag_tools::logging::init_cli_logger;
use autodiag_tools::model::DataBundle;
use autodiag_tools::{Result, WorkbookLayout, load_data, load_data_from_excel};
use clap::{Parser, Subcommand};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_cli_logger(cli.verbose)?;
    match cli.command {
        Command::Inspect(args) => execute_inspect(args),
        Command::Export(args) => execute_export(args),
    }
}

fn execute_inspect(args: InspectArgs) -> Result<()> {
    let bundle = args.source.load()?;
    let json = serde_json::to_string_pretty(&bundle)?;
    match args.output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn execute_export(args: ExportArgs) -> Result<()> {
    let bundle = args.source.load()?;
    let workbook = build_workbook(&bundle);
    excel_write::write_workbook(&args.output, &workbook)
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Ingest the self-assessment questionnaire workbook."
)]
struct Cli {
    /// Log debug details of the ingestion.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the normalized questionnaire as JSON.
    Inspect(InspectArgs),
    /// Write the normalized questionnaire to a new workbook.
    Export(ExportArgs),
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Directory searched for the questionnaire workbook.
    #[arg(long, default_value = "data", conflicts_with = "workbook")]
    data_dir: PathBuf,

    /// Explicit workbook path; skips the directory search.
    #[arg(long)]
    workbook: Option<PathBuf>,

    /// Expected workbook file name inside the data directory.
    #[arg(long)]
    workbook_name: Option<String>,
}

impl SourceArgs {
    fn load(&self) -> Result<DataBundle> {
        let mut layout = WorkbookLayout::default();
        if let Some(name) = &self.workbook_name {
            layout.file_name = name.clone();
        }
        match &self.workbook {
            Some(path) => load_data_from_excel(path, &layout),
            None => load_data(&self.data_dir, &layout),
        }
    }
}

#[derive(clap::Args)]
struct InspectArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Write the JSON to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct ExportArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output workbook path.
    #[arg(long)]
    output: PathBuf,
}
