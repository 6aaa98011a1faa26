//! Manifest refresh and expectation metadata updates for a
//! web-platform-tests checkout.
//!
//! The heavy lifting (manifest building, expectation reconciliation) is done
//! by external tools behind the [`manifest::ManifestLoader`],
//! [`metadata::ExpectationUpdater`], and [`products::ProductLoader`] seams;
//! [`update::UpdateOrchestrator`] wires them together.
pub mod checks;
pub mod cli;
pub mod config;
pub mod environment;
pub mod manifest;
pub mod metadata;
pub mod products;
pub mod update;
pub mod util;
