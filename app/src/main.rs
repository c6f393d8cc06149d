use std::path::PathBuf;

use clap::Parser;
use common::config::Config;
use eyre::Result;
use tracing::error;
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

mod chart;

/// Workspace crates that log, each gets the default level unless `--log` names it
const MODULES: &[&str] = &["common", "plot_common", "grouped_bar"];

/// Grouped log-scale bar chart of benchmark throughput
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Tab separated results file
    file: PathBuf,
    /// YAML config with the separator, viewer and plot styling
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Image to write, `.svg` for SVG, anything else for PNG
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Only write the image, do not open it
    #[arg(long, default_value_t = false)]
    no_show: bool,
    /// Print the parsed table as JSON
    #[arg(long, default_value_t = false)]
    dump: bool,
    /// Extra log directives, e.g. `common=debug`
    #[arg(short, long)]
    log: Vec<String>,
    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("warn".to_owned());
    let args = Cli::parse();

    let mut env_filter = EnvFilter::new(format!("throughput_chart={log_level}"));
    for log in &args.log {
        env_filter = env_filter.add_directive(log.parse()?);
    }
    for module in MODULES {
        if !args.log.iter().any(|x| x.starts_with(module)) {
            env_filter = env_filter.add_directive(format!("{module}={log_level}").parse()?);
        }
    }

    let (file_layer, _guard) = match &args.log_file {
        Some(path) => {
            let file_appender = tracing_appender::rolling::never(
                path.parent().unwrap_or(std::path::Path::new(".")),
                path.file_name().unwrap_or("log.log".as_ref()),
            );
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (
                Some(layer().with_writer(non_blocking).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_writer(std::io::stderr)
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .with(file_layer)
        .init();

    let config = match &args.config {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };

    let options = chart::ChartOptions {
        file: args.file,
        output: args.output,
        show: !args.no_show,
        dump: args.dump,
    };
    if let Err(err) = chart::run_chart(&config, &options) {
        error!("{err:#?}");
        return Err(err);
    }

    Ok(())
}
