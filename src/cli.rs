use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::service::ExportSource;

#[derive(Parser, Debug)]
#[command(name = "varsmith", version, about)]
pub struct Args {
    /// Path to config.toml (overrides VARSMITH_CONFIG and XDG default)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More logging on stderr (-v info, -vv debug); RUST_LOG wins when set
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Count what the document can export
    Status(DocumentArg),

    /// Generate files
    Export(ExportArgs),

    /// List the files an export would write, with size estimates
    Preview(PreviewArgs),
}

#[derive(ClapArgs, Debug)]
pub struct DocumentArg {
    /// JSON snapshot of the document
    #[arg(long)]
    pub document: PathBuf,
}

#[derive(ClapArgs, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub doc: DocumentArg,

    /// Output format (css, scss, js, tailwind); defaults to the configured one
    #[arg(long)]
    pub format: Option<String>,

    #[arg(long, value_enum, default_value_t = ExportSource::Variables)]
    pub source: ExportSource,

    /// Only write files whose name matches this glob (repeatable)
    #[arg(long = "select")]
    pub select: Vec<String>,

    /// Output directory; defaults to [export] out_dir
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Print the payload as JSON instead of writing files
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Print an analysis report to stderr
    #[arg(long, value_enum, default_value_t = ReportMode::Off)]
    pub report: ReportMode,
}

#[derive(ClapArgs, Debug)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub doc: DocumentArg,

    #[arg(long)]
    pub format: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportMode {
    Off,
    Summary,
    Full,
}
