use std::{
    path::{Path, PathBuf},
    process::Command,
};

use common::{
    config::Config,
    plot::{Plot, plot},
    table::MeasurementTable,
};
use eyre::{Context, Result, bail};
use grouped_bar::GroupedBar;
use tracing::{debug, info};

pub struct ChartOptions {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub show: bool,
    pub dump: bool,
}

/// Loads the results file, renders every configured plot and opens the images
pub fn run_chart(config: &Config, options: &ChartOptions) -> Result<Vec<PathBuf>> {
    let table = MeasurementTable::from_path(&options.file, config.separator)
        .wrap_err_with(|| format!("Load results {}", options.file.display()))?;
    debug!("columns={:?}", table.columns());
    info!(
        "Loaded {} traces and {} labels from {}",
        table.len(),
        table.labels().len(),
        options.file.display()
    );

    if options.dump {
        println!("{}", serde_json::to_string_pretty(&table)?);
    }

    let output = match &options.output {
        Some(output) => output.clone(),
        None => default_output(&options.file)?,
    };
    let plots = configured_plots(config);
    let paths = plot(&plots, &table, &output)?;

    if options.show {
        for path in &paths {
            show(&config.viewer, path)?;
        }
    }
    Ok(paths)
}

fn configured_plots(config: &Config) -> Vec<Box<dyn Plot>> {
    match &config.plots {
        Some(plots) => plots.clone(),
        None => vec![Box::new(GroupedBar::default())],
    }
}

/// A new `<tmp>/<input stem>-<random>.png` that is left in place for the viewer
fn default_output(file: &Path) -> Result<PathBuf> {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or("chart".to_owned());
    let path = tempfile::Builder::new()
        .prefix(&format!("{stem}-"))
        .suffix(".png")
        .tempfile()
        .context("Create output file")?
        .into_temp_path()
        .keep()?;
    Ok(path)
}

/// Opens `path` with `viewer` and waits for the viewer to exit
fn show(viewer: &str, path: &Path) -> Result<()> {
    debug!("Opening {} with {viewer}", path.display());
    let status = Command::new(viewer)
        .arg(path)
        .status()
        .context(format!("Run viewer {viewer}"))?;

    if !status.success() {
        bail!("Viewer {viewer} exited with {status}");
    }
    Ok(())
}
