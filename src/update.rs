//! Manifest refresh followed by an expectation update.
//!
//! The orchestrator default-fills the caller's options, resolves which result
//! properties key the expectations, validates the bundle, and then delegates
//! to the manifest and metadata backends. Every error aborts the invocation;
//! files already rewritten by a backend are left as they are.
use crate::checks::check_args_metadata_update;
use crate::config::{TestPathSet, UpdateConfig, MANIFEST_FILE_NAME};
use crate::environment::Environment;
use crate::manifest::ManifestLoader;
use crate::metadata::{ExpectationUpdate, ExpectationUpdater};
use crate::products::{ProductLoader, UpdateProperties};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const PRODUCT_PROPERTY: &str = "product";

pub struct UpdateOrchestrator<'a> {
    root: PathBuf,
    manifests: &'a dyn ManifestLoader,
    products: &'a dyn ProductLoader,
    expectations: &'a dyn ExpectationUpdater,
}

impl<'a> UpdateOrchestrator<'a> {
    pub fn new(
        root: PathBuf,
        manifests: &'a dyn ManifestLoader,
        products: &'a dyn ProductLoader,
        expectations: &'a dyn ExpectationUpdater,
    ) -> Self {
        Self {
            root,
            manifests,
            products,
            expectations,
        }
    }

    pub fn refresh_manifests(&self, test_paths: &TestPathSet) -> Result<()> {
        refresh_manifests(self.manifests, test_paths)
    }

    /// Fill `tests_root`, `manifest_path`, and the `product` extra property.
    pub fn apply_defaults(&self, config: &mut UpdateConfig) {
        apply_path_defaults(&self.root, config);
        if !config.extra_property.iter().any(|p| p == PRODUCT_PROPERTY) {
            config.extra_property.push(PRODUCT_PROPERTY.to_string());
        }
    }

    /// Product-configured properties plus the extra ones, or the extra
    /// properties alone when no product is named.
    ///
    /// Products are looked up in `config.config_file`; call
    /// [`UpdateConfig::ensure_config_file`] first when only a path is set.
    pub fn resolve_update_properties(&self, config: &UpdateConfig) -> Result<UpdateProperties> {
        let Some(product) = config.product.as_deref() else {
            return Ok(UpdateProperties::new(
                config.extra_property.clone(),
                BTreeMap::new(),
            ));
        };
        let mut properties = self
            .products
            .load_product_update(config.config_file.as_ref(), product)
            .with_context(|| format!("load update properties for product {product}"))?;
        properties
            .properties
            .extend(config.extra_property.iter().cloned());
        Ok(properties)
    }

    /// Refresh manifests and update expectations from the given run logs.
    ///
    /// `environment` is recorded for diagnostics only.
    pub fn update_expectations(
        &self,
        environment: &Environment,
        mut config: UpdateConfig,
    ) -> Result<()> {
        tracing::debug!(?environment, root = %self.root.display(), "starting expectation update");
        self.apply_defaults(&mut config);
        config.ensure_config_file()?;
        let update_properties = self.resolve_update_properties(&config)?;
        tracing::debug!(?update_properties, "resolved update properties");

        let config =
            check_args_metadata_update(config).context("check metadata-update arguments")?;

        self.refresh_manifests(&config.test_paths)?;

        let request = ExpectationUpdate {
            test_paths: config.test_paths,
            run_log: config.run_log,
            update_properties,
            full_update: false,
            disable_intermittent: config.update_intermittent,
            update_intermittent: config.update_intermittent,
            remove_intermittent: config.update_intermittent,
        };
        tracing::info!(
            run_logs = request.run_log.len(),
            intermittent = config.update_intermittent,
            "updating expectation metadata"
        );
        self.expectations
            .update_expected(&request)
            .context("update expectation metadata")
    }
}

/// Rebuild the manifest of every test tree, one URL base at a time.
pub fn refresh_manifests(manifests: &dyn ManifestLoader, test_paths: &TestPathSet) -> Result<()> {
    for (url_base, paths) in test_paths {
        let manifest_path = paths.manifest_path();
        tracing::info!(
            url_base = %url_base,
            tests = %paths.tests_path.display(),
            manifest = %manifest_path.display(),
            "updating manifest"
        );
        manifests
            .load_and_update(&paths.tests_path, &manifest_path, url_base)
            .with_context(|| format!("update manifest for {url_base}"))?;
    }
    Ok(())
}

/// Default `tests_root` to the checkout root and `manifest_path` to
/// `<root>/MANIFEST.json`, the same location `wpt run` writes to.
pub fn apply_path_defaults(root: &Path, config: &mut UpdateConfig) {
    if is_unset(config.tests_root.as_deref()) {
        config.tests_root = Some(root.to_path_buf());
    }
    if is_unset(config.manifest_path.as_deref()) {
        config.manifest_path = Some(root.join(MANIFEST_FILE_NAME));
    }
}

fn is_unset(path: Option<&Path>) -> bool {
    match path {
        Some(path) => path.as_os_str().is_empty(),
        None => true,
    }
}
