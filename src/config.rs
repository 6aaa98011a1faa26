//! Update configuration and the optional JSON config file.
//!
//! `UpdateConfig` is the per-invocation option bundle; every field starts out
//! as the caller supplied it and is default-filled by the orchestrator and the
//! argument checker. Nothing here outlives a single run.
use crate::products::UpdateProperties;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the manifest written at the root of a test tree.
pub const MANIFEST_FILE_NAME: &str = "MANIFEST.json";

/// URL base of the primary test tree.
pub const ROOT_URL_BASE: &str = "/";

/// Locations of one test tree served under a URL base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPathEntry {
    pub tests_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_path: Option<PathBuf>,
}

impl TestPathEntry {
    /// Metadata lives next to the tests unless configured otherwise.
    pub fn metadata_path(&self) -> &Path {
        self.metadata_path.as_deref().unwrap_or(&self.tests_path)
    }

    /// Return the configured manifest path or `<metadata_path>/MANIFEST.json`.
    pub fn manifest_path(&self) -> PathBuf {
        match &self.manifest_path {
            Some(path) => path.clone(),
            None => self.metadata_path().join(MANIFEST_FILE_NAME),
        }
    }

    fn resolve_against(&mut self, base: &Path) {
        self.tests_path = base.join(&self.tests_path);
        if let Some(path) = self.metadata_path.take() {
            self.metadata_path = Some(base.join(path));
        }
        if let Some(path) = self.manifest_path.take() {
            self.manifest_path = Some(base.join(path));
        }
    }
}

/// URL base → test tree locations, visited in a stable order.
pub type TestPathSet = BTreeMap<String, TestPathEntry>;

/// Options recognized by the expectation update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateConfig {
    pub tests_root: Option<PathBuf>,
    pub metadata_root: Option<PathBuf>,
    pub manifest_path: Option<PathBuf>,
    pub product: Option<String>,
    pub extra_property: Vec<String>,
    /// Product-config source; also seeds `test_paths` and tool commands.
    pub config: Option<PathBuf>,
    /// Parsed contents of `config`, loaded at most once per run.
    pub config_file: Option<WptConfig>,
    pub run_log: Vec<PathBuf>,
    pub update_intermittent: bool,
    pub test_paths: TestPathSet,
}

impl UpdateConfig {
    /// Parse `config` unless a parsed copy is already attached.
    pub fn ensure_config_file(&mut self) -> Result<()> {
        if self.config_file.is_none() {
            self.config_file = Some(WptConfig::load_optional(self.config.as_deref())?);
        }
        Ok(())
    }
}

/// Tool command lines, as shell-style strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub manifest: Option<String>,
    #[serde(default)]
    pub metadata: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductConfig {
    #[serde(default)]
    pub update_properties: Option<UpdateProperties>,
}

/// Contents of the JSON config file passed with `--config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WptConfig {
    #[serde(default)]
    pub test_paths: TestPathSet,
    #[serde(default)]
    pub products: BTreeMap<String, ProductConfig>,
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl WptConfig {
    /// Load a config file; relative test paths resolve against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
        let mut config: WptConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse config JSON {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for entry in config.test_paths.values_mut() {
            entry.resolve_against(base);
        }
        Ok(config)
    }

    /// Load `path` when given, otherwise return an empty config.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
