use std::path::PathBuf;

use clap::Parser;

use epicsgen_cli::cli;
use epicsgen_cli::logger;

#[derive(Parser, Debug)]
#[command(
    name = "epicsgen",
    about = "EPICS artifact generator for annotated device driver sources"
)]
struct Args {
    /// Turn on verbose logging.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    action: Action,
}

#[derive(clap::Subcommand, Debug)]
enum Action {
    /// Generate the EPICS record database for one driver source.
    Db {
        /// Input driver source file.
        #[arg(short, long)]
        input: PathBuf,
        /// Output database file.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Generate Display Builder screens for one driver source.
    Screen {
        /// Input driver source file.
        #[arg(short, long)]
        input: PathBuf,
        /// Output directory for the screen files.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Generate snapshot tables for every device an IOC loads.
    Pvtable {
        /// IOC startup descriptor (st.cmd).
        startup: PathBuf,
        /// Directory containing the driver sources.
        #[arg(long)]
        src_dir: PathBuf,
        /// Output directory for the table files.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the record-name prefix, example BL99:Det:
        #[arg(short = 'b', long)]
        prefix: Option<String>,
        /// Overwrite existing tables instead of merging into them.
        #[arg(long)]
        force: bool,
    },
    /// Generate an archiver engine-config fragment for an IOC.
    Archive {
        /// IOC startup descriptor (st.cmd).
        startup: PathBuf,
        /// Directory containing the driver sources.
        #[arg(long)]
        src_dir: PathBuf,
        /// Override the record-name prefix, example BL99:Det:
        #[arg(short = 'b', long)]
        prefix: Option<String>,
        /// Output file; prints to stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn main() -> Result<(), String> {
    let args = Args::parse();

    logger::configure(args.verbose)?;

    match args.action {
        Action::Db { input, output } => cli::db(&input, &output, false),
        Action::Screen { input, output } => cli::screen(&input, &output, false),
        Action::Pvtable {
            startup,
            src_dir,
            output,
            prefix,
            force,
        } => cli::pvtable(
            &startup,
            &src_dir,
            output.as_deref(),
            prefix.as_deref(),
            force,
            false,
        ),
        Action::Archive {
            startup,
            src_dir,
            prefix,
            output,
        } => cli::archive(
            &startup,
            &src_dir,
            prefix.as_deref(),
            output.as_deref(),
            false,
        ),
    }
}
