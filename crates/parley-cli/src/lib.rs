#![warn(unused_crate_dependencies)]

use anyhow::Context as _;
use parley_client_core::{get_configuration, Client, Credentials, FileCredentialStore};
use ::tracing::info;

pub mod cli;
mod commands;
pub mod runtime;
pub mod tracing;

/// Loads the configuration, opens the stored session and runs the command
pub async fn run(cli: cli::Cli) -> anyhow::Result<()> {
    let config = get_configuration(cli.config.clone()).context("failed to read configuration")?;
    info!(?config, "configuration loaded");
    let credentials = Credentials::new(FileCredentialStore::new(config.credentials_path.clone()));
    let client = Client::new(&config, credentials)?;
    commands::execute(cli.command, &client).await
}
