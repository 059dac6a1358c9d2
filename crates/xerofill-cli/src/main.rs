use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "xerofill")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Fill Xero timesheet entries from the command line",
    long_about = "xerofill drives a Chrome session through the Xero UI: it logs in, checks \
                  which days already have recorded hours, and creates entries for the days \
                  that read as empty. Weekends are always skipped."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill time entries (today by default, or a date or range)
    Fill(commands::fill::FillArgs),

    /// Encode email and password into a XERO_CREDENTIALS blob
    EncodeCredentials(commands::credentials::EncodeArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Seed the environment from a .env file when one is present
    dotenv::dotenv().ok();

    // Execute the command
    match cli.command {
        Commands::Fill(args) => commands::fill::execute(args),
        Commands::EncodeCredentials(args) => commands::credentials::execute(args),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("xerofill=debug,xerofill_core=debug,xerofill_browser=debug")
    } else {
        EnvFilter::new("xerofill=info,xerofill_core=info,xerofill_browser=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
