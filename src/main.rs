use anyhow::Result;
use clap::{Parser, Subcommand};

mod batch;
mod check;
mod format;
mod merge_cmd;
mod telemetry;

/// Build-time merger for Python sources
///
/// Combines a shared template file with a user file that holds
/// type-specific logic. Imports from both files are flattened into one
/// deduplicated block. When both files define the same top-level function
/// or class, the template's definition wins.
///
/// QUICK START:
///
///   # Clone the default template repository and merge into it
///   spinning-wheel merge rotate_postgres.py build/lambda_function.py
///
///   # Use a local template and keep colliding user definitions
///   spinning-wheel merge user.py out.py --template template.py --collision rename
///
/// CONFIGURATION:
///
///   Defaults are read from ./spinning-wheel.toml (or --config,
///   or $SPINNING_WHEEL_CONFIG). Flags override the file.
///
/// LOGGING:
///
///   Dropped and renamed declarations are logged to stderr. Set RUST_LOG
///   (e.g. RUST_LOG=debug) for more detail.
#[derive(Parser)]
#[command(name = "spinning-wheel")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(
    after_help = "See 'spinning-wheel <command> --help' for more information on a specific command."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Merge(merge_cmd::MergeArgs),
    Batch(batch::BatchArgs),
    Check(check::CheckArgs),
}

fn main() -> Result<()> {
    let _telemetry = telemetry::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge(ref args) => merge_cmd::run(args),
        Commands::Batch(ref args) => batch::run(args),
        Commands::Check(ref args) => check::run(args),
    }
}
