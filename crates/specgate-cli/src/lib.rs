//! # specgate-cli: Command-Line Gate
//!
//! Provides the `specgate` binary, which runs the pre-ingestion gate over
//! catalog descriptor files outside of a running catalog (for example in
//! CI, before a descriptor change is merged).
//!
//! ## Subcommands
//!
//! - `specgate validate`: validate every entity in one or more
//!   descriptor files.
//! - `specgate rules`: list rule codes, severities, and descriptions.
//!
//! ```bash
//! specgate validate catalog-info.yaml
//! specgate -v --config specgate.yaml validate apis/*.yaml --format json
//! specgate rules --dialect openapi
//! ```

pub mod descriptor;
pub mod rules;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};

use specgate_catalog::GateConfig;

/// Load the gate config from `path`, or use the defaults.
pub fn load_config(path: Option<&Path>) -> Result<GateConfig> {
    match path {
        Some(path) => GateConfig::load(path)
            .with_context(|| format!("failed to load config: {}", path.display())),
        None => Ok(GateConfig::default()),
    }
}
