use std::{fs::read_to_string, path::Path};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::plot::Plot;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Field separator of the results file
    pub separator: char,
    /// Program that displays the finished figure
    pub viewer: String,
    /// Plots to render, the default bar chart when unset
    pub plots: Option<Vec<Box<dyn Plot>>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            separator: '\t',
            viewer: default_viewer().to_owned(),
            plots: None,
        }
    }
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = read_to_string(path).context(format!("Read config {}", path.display()))?;
        serde_yml::from_str(&data).context(format!("Parse config {}", path.display()))
    }
}

pub fn default_viewer() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}
