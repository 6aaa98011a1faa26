//! CLI argument parsing for manifest and expectation updates.
use crate::config::UpdateConfig;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "wpt-update",
    version,
    about = "Refresh web-platform-test manifests and update expectation metadata",
    after_help = "Examples:\n  wpt-update update-expectations --product firefox --metadata-command 'python3 tools/update_meta.py' wptreport.json\n  wpt-update update-expectations --update-intermittent --config wptrunner.json run1.json run2.json\n  wpt-update manifest-update --tests css --manifest css/MANIFEST.json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    UpdateExpectations(UpdateArgs),
    ManifestUpdate(ManifestArgs),
}

/// Locations shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct PathArgs {
    /// Root of the web-platform-tests checkout (default: $WPT_ROOT or discovered)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Path to the folder containing test files
    #[arg(long = "tests", value_name = "DIR")]
    pub tests_root: Option<PathBuf>,

    /// Path to the folder containing test metadata
    #[arg(long = "metadata", value_name = "DIR")]
    pub metadata_root: Option<PathBuf>,

    /// Path to test manifest (default: <root>/MANIFEST.json)
    #[arg(long = "manifest", value_name = "FILE")]
    pub manifest_path: Option<PathBuf>,

    /// Path to a JSON config file with test paths, products, and tools
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Command that rebuilds a manifest (default: ./wpt manifest)
    #[arg(long, value_name = "CMD")]
    pub manifest_command: Option<String>,
}

/// Metadata-update command inputs.
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "update-expectations",
    about = "Update expectation metadata from the logs of a test run"
)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Product whose configured update properties key the expectations
    #[arg(long, value_name = "NAME")]
    pub product: Option<String>,

    /// Extra property from run_info.json to use in metadata update
    #[arg(long = "extra-property", value_name = "PROPERTY")]
    pub extra_property: Vec<String>,

    /// Update, disable, and remove intermittent expectations together
    #[arg(long)]
    pub update_intermittent: bool,

    /// Virtualenv the external tools run from (default: $VIRTUAL_ENV)
    #[arg(long, value_name = "DIR")]
    pub venv: Option<PathBuf>,

    /// Command that applies an expectation update request
    #[arg(long, value_name = "CMD")]
    pub metadata_command: Option<String>,

    /// Log files from the test run
    #[arg(value_name = "RUN_LOG")]
    pub run_log: Vec<PathBuf>,
}

/// Manifest-only command inputs.
#[derive(Parser, Debug, Clone, Default)]
#[command(about = "Rebuild test manifests without touching expectations")]
pub struct ManifestArgs {
    #[command(flatten)]
    pub paths: PathArgs,
}

/// Argument specification of the metadata-update command.
pub fn create_parser_update() -> clap::Command {
    UpdateArgs::command()
}

impl PathArgs {
    /// Seed an `UpdateConfig` with these paths, absolute against `cwd`.
    pub fn into_config(self, cwd: &Path) -> UpdateConfig {
        UpdateConfig {
            tests_root: self.tests_root.map(|path| abs_path(cwd, path)),
            metadata_root: self.metadata_root.map(|path| abs_path(cwd, path)),
            manifest_path: self.manifest_path.map(|path| abs_path(cwd, path)),
            config: self.config.map(|path| abs_path(cwd, path)),
            ..UpdateConfig::default()
        }
    }
}

impl UpdateArgs {
    pub fn into_config(self, cwd: &Path) -> UpdateConfig {
        UpdateConfig {
            product: self.product,
            extra_property: self.extra_property,
            update_intermittent: self.update_intermittent,
            run_log: self
                .run_log
                .into_iter()
                .map(|path| abs_path(cwd, path))
                .collect(),
            ..self.paths.into_config(cwd)
        }
    }
}

fn abs_path(cwd: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}
