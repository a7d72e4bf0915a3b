//! Fleet file loading.
//!
//! A fleet file is a TOML document listing target addresses, so a standing
//! fleet does not have to be repeated on the command line:
//!
//! ```toml
//! targets = ["fi-a.example.net", "fi-b.example.net"]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct FleetFile {
    #[serde(default)]
    pub targets: Vec<String>,
}

/// Read and parse a fleet file.
pub fn load_fleet_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read fleet file: {}", path.display()))?;
    let fleet: FleetFile = toml::from_str(&content)
        .with_context(|| format!("failed to parse fleet file: {}", path.display()))?;
    Ok(fleet.targets)
}
