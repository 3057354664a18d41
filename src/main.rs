use cfscli::{
    actions::execute_command,
    commands::{command_tree, create_cli_command, verbose_requested},
    error::CliError,
};
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Debug output with `--verbose`; otherwise `RUST_LOG`, defaulting to warnings.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), CliError> {
    // before generation, so the generator and patch logs are kept
    init_logging(verbose_requested(std::env::args().skip(1)));

    let tree = command_tree()?;
    let matches = match create_cli_command(&tree).try_get_matches() {
        Ok(matches) => matches,
        // help and version requests exit here too
        Err(e) => e.exit(),
    };

    execute_command(&tree, &matches).await
}

/// Main entry point for the program
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        ::std::process::exit(e.exit_code().code());
    }
}
