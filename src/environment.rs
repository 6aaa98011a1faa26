//! Checkout location and execution environment.
use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

/// Execution environment the update runs under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// Virtualenv the external tools were installed into, if any.
    pub venv: Option<PathBuf>,
}

impl Environment {
    /// `--venv`, else `$VIRTUAL_ENV`.
    pub fn detect(venv: Option<PathBuf>) -> Self {
        let venv = venv.or_else(|| std::env::var_os("VIRTUAL_ENV").map(PathBuf::from));
        Self { venv }
    }
}

/// Resolve the checkout root from `--root`, `$WPT_ROOT`, or the nearest
/// ancestor of `start` that looks like a web-platform-tests checkout.
/// Relative roots are taken relative to `start`.
pub fn resolve_root(explicit: Option<PathBuf>, start: &Path) -> Result<PathBuf> {
    if let Some(root) = explicit.or_else(|| std::env::var_os("WPT_ROOT").map(PathBuf::from)) {
        return Ok(start.join(root));
    }
    discover_root(start).ok_or_else(|| {
        anyhow!(
            "could not find a web-platform-tests checkout above {}; pass --root",
            start.display()
        )
    })
}

pub fn discover_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join("wpt").is_file() && dir.join("tools").is_dir())
        .map(Path::to_path_buf)
}
