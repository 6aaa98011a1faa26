//! Per-product update properties.
use crate::config::WptConfig;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result properties used to key expectation updates.
///
/// `defaults` maps a property to the properties that only make sense
/// alongside it (e.g. `os` → `version`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProperties {
    pub properties: Vec<String>,
    #[serde(default)]
    pub defaults: BTreeMap<String, Vec<String>>,
}

impl UpdateProperties {
    pub fn new(properties: Vec<String>, defaults: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            properties,
            defaults,
        }
    }

    /// Platform-distinguishing properties used when a product configures none.
    pub fn platform_default() -> Self {
        let defaults = BTreeMap::from([
            ("os".to_string(), vec!["version".to_string()]),
            ("processor".to_string(), vec!["bits".to_string()]),
        ]);
        Self::new(
            vec!["debug".to_string(), "os".to_string(), "processor".to_string()],
            defaults,
        )
    }
}

/// Source of a product's configured update properties.
pub trait ProductLoader {
    fn load_product_update(
        &self,
        config: Option<&WptConfig>,
        product: &str,
    ) -> Result<UpdateProperties>;
}

/// Reads `products.<name>.update_properties` from the parsed config file.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigProductLoader;

impl ProductLoader for ConfigProductLoader {
    fn load_product_update(
        &self,
        config: Option<&WptConfig>,
        product: &str,
    ) -> Result<UpdateProperties> {
        let Some(config) = config.filter(|config| !config.products.is_empty()) else {
            tracing::info!(product, "no products configured; using platform defaults");
            return Ok(UpdateProperties::platform_default());
        };
        let entry = config.products.get(product).ok_or_else(|| {
            let known: Vec<&str> = config.products.keys().map(String::as_str).collect();
            anyhow!(
                "unknown product {product:?} (configured: {})",
                known.join(", ")
            )
        })?;
        match &entry.update_properties {
            Some(properties) => {
                tracing::debug!(product, ?properties, "loaded product update properties");
                Ok(properties.clone())
            }
            None => {
                tracing::info!(product, "no update properties configured; using platform defaults");
                Ok(UpdateProperties::platform_default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(json: &str) -> WptConfig {
        serde_json::from_str(json).expect("parse config")
    }

    #[test]
    fn reads_configured_product_properties() {
        let config = config(
            r#"{"products": {"servo": {"update_properties": {
                "properties": ["os", "debug"],
                "defaults": {"os": ["version"]}
            }}}}"#,
        );

        let properties = ConfigProductLoader
            .load_product_update(Some(&config), "servo")
            .expect("load");
        assert_eq!(properties.properties, vec!["os", "debug"]);
        assert_eq!(properties.defaults["os"], vec!["version"]);
    }

    #[test]
    fn without_products_falls_back_to_platform_defaults() {
        let properties = ConfigProductLoader
            .load_product_update(None, "chrome")
            .expect("load");
        assert_eq!(properties, UpdateProperties::platform_default());

        let properties = ConfigProductLoader
            .load_product_update(Some(&WptConfig::default()), "chrome")
            .expect("load");
        assert_eq!(properties, UpdateProperties::platform_default());
    }

    #[test]
    fn known_product_without_properties_uses_platform_defaults() {
        let config = config(r#"{"products": {"chrome": {}}}"#);
        let properties = ConfigProductLoader
            .load_product_update(Some(&config), "chrome")
            .expect("load");
        assert_eq!(properties, UpdateProperties::platform_default());
    }

    #[test]
    fn unknown_product_is_an_error() {
        let config = config(
            r#"{"products": {
                "firefox": {"update_properties": {"properties": ["os"]}},
                "chrome": {}
            }}"#,
        );
        let err = ConfigProductLoader
            .load_product_update(Some(&config), "firefx")
            .expect_err("typo in product name");
        let message = err.to_string();
        assert!(message.contains("unknown product \"firefx\""), "{message}");
        assert!(message.contains("chrome, firefox"), "{message}");
    }
}
