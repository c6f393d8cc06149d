use core::fmt::Debug;
use std::{
    fs::create_dir_all,
    path::{Path, PathBuf},
};

use dyn_clone::{DynClone, clone_trait_object};
use eyre::{Context, Result};
use tracing::debug;

use crate::table::MeasurementTable;

#[typetag::serde(tag = "type")]
pub trait Plot: Debug + DynClone + Send + Sync {
    /// Name of the plot, for logging
    fn name(&self) -> &'static str;
    /// Renders the table into an image file
    ///
    /// Arguments:
    /// * `table` - Parsed results file
    /// * `plot_path` - The image to write, its extension selects the image format
    fn plot(&self, table: &MeasurementTable, plot_path: &Path) -> Result<()>;
}
clone_trait_object!(Plot);

/// Output file for each of `count` plots.
///
/// The first plot writes to `output` itself, plot `k` writes to `<stem>-<k>.<ext>` beside it.
pub fn plot_paths(output: &Path, count: usize) -> Vec<PathBuf> {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = output
        .extension()
        .map(|s| format!(".{}", s.to_string_lossy()))
        .unwrap_or_default();

    (0..count)
        .map(|k| {
            if k == 0 {
                output.to_path_buf()
            } else {
                output.with_file_name(format!("{stem}-{k}{extension}"))
            }
        })
        .collect()
}

pub fn ensure_plot_dir(plot_path: &Path) -> Result<()> {
    if let Some(parent) = plot_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        create_dir_all(parent).context(format!("Create plot dir {}", parent.display()))?;
    }
    Ok(())
}

/// Runs every plot against the table, returning the files written
pub fn plot(
    plots: &[Box<dyn Plot>],
    table: &MeasurementTable,
    output: &Path,
) -> Result<Vec<PathBuf>> {
    if plots.is_empty() {
        debug!("No plots");
        return Ok(Vec::new());
    }

    let paths = plot_paths(output, plots.len());
    for (plot, plot_path) in plots.iter().zip(&paths) {
        ensure_plot_dir(plot_path)?;
        debug!("Plotting {} to {}", plot.name(), plot_path.display());
        plot.plot(table, plot_path)
            .wrap_err_with(|| format!("Plot {} to {}", plot.name(), plot_path.display()))?;
    }
    Ok(paths)
}
