//! Command-line front end: loads one admin collection and prints it.
mod cli;
mod config;
mod render;
mod runner;

use std::path::Path;
use std::process::ExitCode;

use admin_logging::{admin_error, admin_info};
use anyhow::{bail, Context, Result};
use clap::Parser;
use salon_core::{Collection, ListState, Msg};
use salon_engine::{export_records, EngineHandle};

use cli::{Cli, Command, ListRequest};
use config::{load_config, save_config, AdminConfig, TOKEN_ENV};
use runner::{EffectRunner, RunOutcome};

const EXIT_FAILURE: u8 = 1;
const EXIT_LOGIN_REQUIRED: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            admin_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let request = match cli.command {
        Command::InitConfig { force } => {
            init_logging(&AdminConfig::default(), cli.verbose);
            init_config(&cli.config, force)?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Clients(list) => list.into_request(Collection::Clients)?,
        Command::Users(list) => list.into_request(Collection::Users)?,
        Command::Broadcasts(list) => list.into_request(Collection::Broadcasts)?,
        Command::Promotions(list) => list.into_request(Collection::Promotions)?,
        Command::Recipients { broadcast_id, list } => {
            list.into_request(Collection::BroadcastRecipients { broadcast_id })?
        }
    };

    let config =
        load_config(&cli.config)?.with_token_override(std::env::var(TOKEN_ENV).ok());
    init_logging(&config, cli.verbose);
    list(&config, request)
}

fn init_logging(config: &AdminConfig, verbose: bool) {
    let level = admin_logging::level_for(verbose || config.verbose);
    admin_logging::initialize(config.log_destination(), level);
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    let written = save_config(path, &AdminConfig::default())?;
    println!("Wrote {}", written.display());
    Ok(())
}

fn list(config: &AdminConfig, request: ListRequest) -> Result<ExitCode> {
    let engine =
        EngineHandle::new(config.client_settings()).context("failed to start the fetch engine")?;
    let runner = EffectRunner::new(engine);

    let state = ListState::new(request.collection.clone())
        .with_filter(request.filter.clone())
        .with_sort(request.sort.clone());
    let (state, outcome) = runner.drive(
        state,
        Msg::Opened {
            collection: request.collection.clone(),
            mode: request.mode,
        },
        config.load_timeout(),
    );

    let view = state.view();
    print!("{}", render::render(&view));

    match outcome {
        RunOutcome::LoginRequired => return Ok(ExitCode::from(EXIT_LOGIN_REQUIRED)),
        RunOutcome::TimedOut => bail!(
            "loading {} did not finish within {:?}",
            request.collection,
            config.load_timeout()
        ),
        RunOutcome::EngineStopped => {
            bail!("the fetch engine stopped while loading {}", request.collection)
        }
        RunOutcome::Completed => {}
    }
    if view.notice.is_some() {
        return Ok(ExitCode::from(EXIT_FAILURE));
    }

    if let Some(path) = &request.export {
        let written = export_records(path, &view.rows)
            .with_context(|| format!("failed to export to {}", path.display()))?;
        admin_info!("Exported {} records to {:?}", view.rows.len(), written);
        println!("Exported {} records to {}", view.rows.len(), written.display());
    }
    Ok(ExitCode::SUCCESS)
}
