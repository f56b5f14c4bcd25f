//! `fornecedores` executable.
//!
//! # Responsibility
//! - Initialize logging, then dispatch to server or fixture commands.
//! - Map failures to a non-zero exit code with one stderr line.

mod config;

use clap::Parser;
use config::{Cli, Command};
use fornecedores_core::db::schema;
use fornecedores_core::{
    default_log_level, init_logging, FixtureService, SqliteSupplierRepository,
};
use log::{error, info};
use std::process::ExitCode;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(err) = init_logging(level, cli.log_dir.as_deref()) {
        eprintln!("fornecedores: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_exit module=cli status=error error={message}");
            eprintln!("fornecedores: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let datastore = cli.datastore();
    match cli.command {
        Command::Serve(args) => fornecedores_api::serve(datastore, args.server_config())
            .await
            .map_err(|err| err.to_string()),
        Command::Setup => schema::setup(&datastore)
            .await
            .map_err(|err| err.to_string()),
        Command::Seed => {
            schema::setup(&datastore)
                .await
                .map_err(|err| err.to_string())?;
            let fixtures = FixtureService::new(SqliteSupplierRepository::new(datastore));
            let report = fixtures.seed().await.map_err(|err| err.to_string())?;
            info!(
                "event=cli_seed module=cli status=ok cleared={} inserted={}",
                report.cleared, report.inserted
            );
            println!("seeded {} suppliers", report.inserted);
            Ok(())
        }
        Command::Reset => {
            schema::setup(&datastore)
                .await
                .map_err(|err| err.to_string())?;
            let fixtures = FixtureService::new(SqliteSupplierRepository::new(datastore));
            let cleared = fixtures.reset().await.map_err(|err| err.to_string())?;
            println!("removed {cleared} suppliers");
            Ok(())
        }
    }
}
