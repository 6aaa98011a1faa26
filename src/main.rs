use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wpt_update::checks::check_args_manifest_update;
use wpt_update::cli::{Command, ManifestArgs, PathArgs, RootArgs, UpdateArgs};
use wpt_update::config::{TestPathSet, WptConfig};
use wpt_update::environment::{resolve_root, Environment};
use wpt_update::manifest::{WptManifestCommand, DEFAULT_MANIFEST_COMMAND};
use wpt_update::metadata::MetadataCommand;
use wpt_update::products::ConfigProductLoader;
use wpt_update::update::{apply_path_defaults, refresh_manifests, UpdateOrchestrator};

fn main() -> Result<()> {
    let args = RootArgs::parse();
    install_subscriber(args.verbose);

    match args.command {
        Command::UpdateExpectations(args) => cmd_update_expectations(args),
        Command::ManifestUpdate(args) => cmd_manifest_update(args),
    }
}

fn install_subscriber(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Checkout root, loaded config file, and the manifest backend for `paths`.
struct Setup {
    cwd: PathBuf,
    root: PathBuf,
    file: WptConfig,
    manifests: WptManifestCommand,
}

fn setup(paths: &PathArgs) -> Result<Setup> {
    let cwd = std::env::current_dir().context("read current directory")?;
    let root = resolve_root(paths.root.clone(), &cwd)?;
    let config_path = paths.config.as_ref().map(|path| cwd.join(path));
    let file = WptConfig::load_optional(config_path.as_deref())?;
    let manifest_command = paths
        .manifest_command
        .as_deref()
        .or(file.tools.manifest.as_deref())
        .unwrap_or(DEFAULT_MANIFEST_COMMAND);
    let manifests = WptManifestCommand::new(manifest_command, &root)
        .context("configure manifest command")?;
    tracing::debug!(root = %root.display(), manifest_command, "resolved checkout");
    Ok(Setup {
        cwd,
        root,
        file,
        manifests,
    })
}

fn cmd_update_expectations(args: UpdateArgs) -> Result<()> {
    let setup = setup(&args.paths)?;
    let metadata_command = args
        .metadata_command
        .clone()
        .or_else(|| setup.file.tools.metadata.clone())
        .ok_or_else(|| {
            anyhow!(
                "no expectation updater configured; pass --metadata-command or set tools.metadata in the config file"
            )
        })?;
    let expectations = MetadataCommand::new(&metadata_command, &setup.root)
        .context("configure metadata command")?;
    let environment = Environment::detect(args.venv.clone());
    if let Some(venv) = &environment.venv {
        tracing::debug!(venv = %venv.display(), "running under virtualenv");
    }

    let mut config = args.into_config(&setup.cwd);
    config.config_file = Some(setup.file);

    let orchestrator = UpdateOrchestrator::new(
        setup.root.clone(),
        &setup.manifests,
        &ConfigProductLoader,
        &expectations,
    );
    orchestrator.update_expectations(&environment, config)?;
    tracing::info!("expectation metadata updated");
    Ok(())
}

fn cmd_manifest_update(args: ManifestArgs) -> Result<()> {
    let setup = setup(&args.paths)?;
    let mut config = args.paths.into_config(&setup.cwd);
    config.config_file = Some(setup.file);
    apply_path_defaults(&setup.root, &mut config);
    let config = check_args_manifest_update(config).context("check manifest arguments")?;
    refresh_manifests(&setup.manifests, &config.test_paths)?;
    report_manifests(&config.test_paths);
    Ok(())
}

fn report_manifests(test_paths: &TestPathSet) {
    for (url_base, entry) in test_paths {
        println!("{url_base}: {}", entry.manifest_path().display());
    }
}
