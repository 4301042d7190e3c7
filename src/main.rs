use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use git_release::boundary::BoundaryWarning;
use git_release::config::{self, Config};
use git_release::git::Git2Repository;
use git_release::interaction::{Interaction, Panel, TerminalInteraction};
use git_release::message::{credential_from_env, select_generator};
use git_release::release::{ReleaseOptions, ReleaseOrchestrator};
use git_release::version_store::VersionStore;
use git_release::ReleaseError;

#[derive(clap::Parser)]
#[command(
    name = "git-release",
    about = "Bump the version, commit, tag and push a release interactively"
)]
struct Args {
    #[arg(long, visible_alias = "preview", help = "Walk through every decision without changing the repository")]
    dry_run: bool,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Branch to push (overrides configuration)")]
    branch: Option<String>,

    #[arg(short, long, help = "Remote to push to (overrides configuration)")]
    remote: Option<String>,

    #[arg(short, long, help = "Manifest whose version field is rewritten")]
    manifest: Option<PathBuf>,

    #[arg(long, help = "Always use the local commit message template")]
    no_ai: bool,

    #[arg(long, help = "Prompt for the API key when it is not in the environment")]
    ask_key: bool,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,

    #[arg(long, help = "Print version information")]
    version: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();

    if args.version {
        println!("git-release {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    init_logging(args.verbose);

    let mut ui = TerminalInteraction::new();
    if let Err(e) = run(&args, &mut ui) {
        let code = e
            .downcast_ref::<ReleaseError>()
            .map(ReleaseError::exit_code)
            .unwrap_or(1);

        match e.downcast_ref::<ReleaseError>() {
            Some(ReleaseError::Cancelled) => {
                ui.show_panel(&Panel::warning("Cancelled", "Release cancelled, nothing was changed."));
            }
            // already reported by the orchestrator
            Some(ReleaseError::ExecutionFailed { .. }) => {}
            _ => ui.show_panel(&Panel::error("Error", format!("{:#}", e))),
        }
        drop(ui);
        std::process::exit(code);
    }
}

fn run(args: &Args, ui: &mut TerminalInteraction) -> Result<()> {
    let mut config = config::load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    config.validate()?;

    let repo = Git2Repository::open(".")
        .context("Not inside a git repository")?
        .with_remote(config.repository.remote.clone());
    let root = repo
        .workdir()
        .ok_or_else(|| ReleaseError::config("bare repositories cannot be released"))?;

    let store = VersionStore::new(root, config.manifest.discovery.clone());
    let credential = resolve_credential(&config, args, ui)?;
    let generator = select_generator(&config.message, &config.project_name, credential);

    let mut options = ReleaseOptions::from_config(&config)?;
    options.dry_run = args.dry_run;

    let report = ReleaseOrchestrator::new(&repo, &store, generator.as_ref(), ui, options).run()?;
    tracing::debug!(?report, "release finished");
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(branch) = &args.branch {
        config.repository.branch = branch.clone();
    }
    if let Some(remote) = &args.remote {
        config.repository.remote = remote.clone();
    }
    if let Some(manifest) = &args.manifest {
        config.manifest.target = manifest.clone();
    }
}

/// The API key for remote message generation, if any.
fn resolve_credential(
    config: &Config,
    args: &Args,
    ui: &mut dyn Interaction,
) -> Result<Option<String>> {
    if args.no_ai {
        return Ok(None);
    }
    if let Some(key) = credential_from_env(&config.message) {
        return Ok(Some(key));
    }

    let warning = BoundaryWarning::NoCredential {
        env: config.message.api_key_env.clone(),
    };
    tracing::info!("{}", warning);

    if args.ask_key {
        let key = ui.enter_secret(&format!("{} (empty for local messages)", config.message.api_key_env))?;
        return Ok(Some(key).filter(|key| !key.trim().is_empty()));
    }

    ui.show_panel(&Panel::info("Commit messages", warning.to_string()));
    Ok(None)
}
