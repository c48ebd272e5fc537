use anyhow::bail;
use parley_shared::telemetry;

const APP_NAME: &str = "parley_cli";
const DEFAULT_FILTER: &str = "info";

pub fn init(cli: &super::cli::Cli) -> anyhow::Result<()> {
    if !cli.is_to_std_out {
        // Log to file
        match telemetry::init_file_subscriber(APP_NAME, DEFAULT_FILTER) {
            Ok(filename) => {
                // stdout is reserved for command output
                eprintln!("Tracing started to file {filename:?}");
                return Ok(());
            }
            Err(e) => {
                // Print error and fall though to logging to stdout
                eprintln!("Failed to start logging to file: {e}");
            }
        }
    }

    // Log to stderr
    match tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init()
    {
        Ok(_) => Ok(()),
        Err(e) => {
            bail!("Failed to start tracing. Error: {e}");
        }
    }
}
