//! Expectation metadata update backends.
//!
//! The reconciliation itself happens in an external updater; this module
//! only describes the request and hands it over.
use crate::config::TestPathSet;
use crate::products::UpdateProperties;
use crate::util::{run_checked, ToolCommand};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Parameters of a single expectation update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpectationUpdate {
    pub test_paths: TestPathSet,
    pub run_log: Vec<PathBuf>,
    pub update_properties: UpdateProperties,
    pub full_update: bool,
    pub disable_intermittent: bool,
    pub update_intermittent: bool,
    pub remove_intermittent: bool,
}

/// Rewrites expectation metadata in place from run logs.
pub trait ExpectationUpdater {
    fn update_expected(&self, request: &ExpectationUpdate) -> Result<()>;
}

/// Hands the request to an external command as `--request <file.json>`.
#[derive(Debug, Clone)]
pub struct MetadataCommand {
    tool: ToolCommand,
    cwd: PathBuf,
}

impl MetadataCommand {
    pub fn new(raw: &str, root: &Path) -> Result<Self> {
        Ok(Self {
            tool: ToolCommand::parse(raw, root)?,
            cwd: root.to_path_buf(),
        })
    }
}

impl ExpectationUpdater for MetadataCommand {
    fn update_expected(&self, request: &ExpectationUpdate) -> Result<()> {
        let mut file = tempfile::Builder::new()
            .prefix("wpt-update-request-")
            .suffix(".json")
            .tempfile()
            .context("create update request file")?;
        let json = serde_json::to_string_pretty(request).context("serialize update request")?;
        file.write_all(json.as_bytes())
            .context("write update request")?;
        file.flush().context("flush update request")?;

        let mut command = self.tool.command();
        command
            .current_dir(&self.cwd)
            .arg("--request")
            .arg(file.path());
        run_checked(command, "expectation update")
    }
}
