#![warn(clippy::all, rust_2018_idioms)]

fn main() -> anyhow::Result<()> {
    use clap::Parser;
    let args = parley_cli::cli::Cli::parse();

    if let Err(e) = parley_cli::tracing::init(&args) {
        eprintln!("Failed to start tracing: {e}");
    }

    let rt = parley_cli::runtime::create_runtime()?;
    rt.block_on(parley_cli::run(args))
}
