//! Validation and normalization of metadata-update arguments.
//!
//! Runs before any file is touched so configuration mistakes fail the whole
//! invocation up front.
use crate::config::{TestPathEntry, UpdateConfig, ROOT_URL_BASE};
use anyhow::{anyhow, Context, Result};
use std::collections::btree_map::Entry;
use std::path::Path;

/// Merge the config file into `config`, then validate every path it names.
pub fn check_args_metadata_update(mut config: UpdateConfig) -> Result<UpdateConfig> {
    set_from_config(&mut config)?;
    check_paths(&mut config)?;
    check_run_logs(&config)?;
    Ok(config)
}

/// Merge the config file and validate test paths; run logs are not consulted.
pub fn check_args_manifest_update(mut config: UpdateConfig) -> Result<UpdateConfig> {
    set_from_config(&mut config)?;
    check_paths(&mut config)?;
    Ok(config)
}

fn set_from_config(config: &mut UpdateConfig) -> Result<()> {
    config.ensure_config_file()?;
    if let Some(file) = &config.config_file {
        for (url_base, entry) in &file.test_paths {
            config
                .test_paths
                .entry(url_base.clone())
                .or_insert_with(|| entry.clone());
        }
    }

    // Command-line paths override the "/" entry one field at a time.
    let entry = match config.test_paths.entry(ROOT_URL_BASE.to_string()) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
            let Some(tests_path) = config
                .tests_root
                .clone()
                .or_else(|| config.metadata_root.clone())
            else {
                return Ok(());
            };
            entry.insert(TestPathEntry {
                tests_path,
                metadata_path: None,
                manifest_path: None,
            })
        }
    };
    if let Some(tests_root) = &config.tests_root {
        entry.tests_path = tests_root.clone();
    }
    if let Some(metadata_root) = &config.metadata_root {
        entry.metadata_path = Some(metadata_root.clone());
    }
    if let Some(manifest_path) = &config.manifest_path {
        entry.manifest_path = Some(manifest_path.clone());
    }
    Ok(())
}

fn check_paths(config: &mut UpdateConfig) -> Result<()> {
    if config.test_paths.is_empty() {
        return Err(anyhow!(
            "no test paths configured; pass --tests or a config file with test_paths"
        ));
    }
    for (url_base, entry) in config.test_paths.iter_mut() {
        require_dir("tests", &entry.tests_path)
            .with_context(|| format!("check test paths for {url_base}"))?;
        let metadata_path = entry.metadata_path().to_path_buf();
        require_dir("metadata", &metadata_path)
            .with_context(|| format!("check test paths for {url_base}"))?;
        entry.metadata_path = Some(metadata_path);

        let manifest_path = entry.manifest_path();
        // The manifest itself may not exist yet; the refresh creates it.
        let manifest_dir = manifest_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        require_dir("manifest", manifest_dir)
            .with_context(|| format!("check test paths for {url_base}"))?;
        entry.manifest_path = Some(manifest_path);
    }
    Ok(())
}

fn require_dir(name: &str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(anyhow!("{name} path is empty"));
    }
    if !path.exists() {
        return Err(anyhow!("{name} path {} does not exist", path.display()));
    }
    if !path.is_dir() {
        return Err(anyhow!("{name} path {} is not a directory", path.display()));
    }
    Ok(())
}

fn check_run_logs(config: &UpdateConfig) -> Result<()> {
    if config.run_log.is_empty() {
        tracing::warn!("no run logs given; expectations will only be pruned");
    }
    for log in &config.run_log {
        if log.is_dir() {
            return Err(anyhow!("log file {} is a directory", log.display()));
        }
        if !log.exists() {
            return Err(anyhow!("log file {} does not exist", log.display()));
        }
    }
    Ok(())
}
