//! Manifest refresh backends.
use crate::util::{run_checked, ToolCommand};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Rebuilds the on-disk manifest for one test tree.
pub trait ManifestLoader {
    fn load_and_update(&self, tests_path: &Path, manifest_path: &Path, url_base: &str)
        -> Result<()>;
}

/// Default manifest command, relative to the repository root.
pub const DEFAULT_MANIFEST_COMMAND: &str = "./wpt manifest";

/// Runs the checkout's `wpt manifest` (or a configured replacement).
#[derive(Debug, Clone)]
pub struct WptManifestCommand {
    tool: ToolCommand,
    cwd: PathBuf,
}

impl WptManifestCommand {
    /// `raw` is a shell-style command line; it runs from `root`.
    pub fn new(raw: &str, root: &Path) -> Result<Self> {
        Ok(Self {
            tool: ToolCommand::parse(raw, root)?,
            cwd: root.to_path_buf(),
        })
    }
}

impl ManifestLoader for WptManifestCommand {
    fn load_and_update(
        &self,
        tests_path: &Path,
        manifest_path: &Path,
        url_base: &str,
    ) -> Result<()> {
        let mut command = self.tool.command();
        command
            .current_dir(&self.cwd)
            .arg("--tests-root")
            .arg(tests_path)
            .arg("--path")
            .arg(manifest_path)
            .arg("--url-base")
            .arg(url_base);
        run_checked(command, "manifest update")
    }
}
