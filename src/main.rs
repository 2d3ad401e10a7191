use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use chronoplot::data::loader::{scan_directory, Candidate};
use chronoplot::processing::transforms::AutofillDirection;
use chronoplot::render::chart::ChartDescription;
use chronoplot::render::export::ExportFormat;
use chronoplot::state::chart_options::{ChartOptions, GraphKind, LineStyle, WeightUnit, XAxisSpacing};
use chronoplot::state::chrono_series::VelocityUnit;
use chronoplot::state::series_set::SeriesSet;

#[derive(Parser, Debug)]
#[command(author, version, about = "Chart chronograph velocity data from a powder charge ladder", long_about = None)]
struct Cli {
    /// Directory holding LabRadar series directories or MagnetoSpeed CSV files
    #[arg(value_hint = ValueHint::DirPath)]
    dir: PathBuf,

    /// Which data source to use when several are found (1-based)
    #[arg(long)]
    source: Option<usize>,

    /// Series numbers to leave out (comma separated)
    #[arg(long)]
    disable: Option<String>,

    /// Convert round-robin shooting into one series per charge
    #[arg(long, action = ArgAction::SetTrue)]
    round_robin: bool,

    /// Charge weights for the enabled series in display order (comma separated)
    #[arg(long, conflicts_with = "autofill")]
    weights: Option<String>,

    /// Fill charge weights as START,INTERVAL
    #[arg(long)]
    autofill: Option<String>,

    /// Autofill with decreasing weights
    #[arg(long, action = ArgAction::SetTrue, requires = "autofill")]
    decreasing: bool,

    /// Chart options JSON; flags below override it
    #[arg(long, value_hint = ValueHint::FilePath)]
    options: Option<PathBuf>,

    /// Plot averages with standard deviation error bars instead of every shot
    #[arg(long, action = ArgAction::SetTrue)]
    line: bool,

    /// Draw a least-squares trend line
    #[arg(long, action = ArgAction::SetTrue)]
    trend: bool,

    /// Dashed trend line
    #[arg(long, action = ArgAction::SetTrue)]
    dashed: bool,

    /// Place series at their literal charge weight
    #[arg(long, action = ArgAction::SetTrue)]
    proportional: bool,

    /// Charge weights are in grams
    #[arg(long, action = ArgAction::SetTrue)]
    grams: bool,

    /// Velocities are in m/s
    #[arg(long, action = ArgAction::SetTrue)]
    mps: bool,

    /// Chart title
    #[arg(long)]
    title: Option<String>,

    /// Image path the chart will be rendered to (extension selects the encoding)
    #[arg(long, value_hint = ValueHint::FilePath)]
    image: Option<PathBuf>,

    /// Output JSON path (`-` for stdout)
    #[arg(short, long, default_value = "-", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// More logging
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct ExportTarget {
    format: ExportFormat,
    path: PathBuf,
}

#[derive(Serialize)]
struct Output<'a> {
    source: String,
    export: Option<ExportTarget>,
    chart: &'a ChartDescription,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    run(cli)
}

fn parse_list<T: std::str::FromStr>(raw: &str, what: &str) -> Result<Vec<T>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| anyhow!("invalid {what} '{s}'"))
        })
        .collect()
}

fn pick_candidate(mut candidates: Vec<Candidate>, source: Option<usize>) -> Result<Candidate> {
    match (candidates.len(), source) {
        (1, None) => Ok(candidates.remove(0)),
        (n, None) => {
            let listing = candidates
                .iter()
                .enumerate()
                .map(|(i, c)| format!("  {}: {c}", i + 1))
                .collect::<Vec<_>>()
                .join("\n");
            bail!("{n} chronograph sources found, choose one with --source:\n{listing}")
        }
        (n, Some(idx)) if idx == 0 || idx > n => {
            bail!("--source must be between 1 and {n}")
        }
        (_, Some(idx)) => Ok(candidates.remove(idx - 1)),
    }
}

fn load_options(cli: &Cli) -> Result<ChartOptions> {
    let mut options = match &cli.options {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read options {}", path.display()))?;
            serde_json::from_str::<ChartOptions>(&json)
                .with_context(|| format!("failed to parse options {}", path.display()))?
        }
        None => ChartOptions::default(),
    };

    if cli.line {
        options.graph_kind = GraphKind::LineWithErrorBars;
    }
    if cli.trend {
        options.trend_line.enabled = true;
    }
    if cli.dashed {
        options.trend_line.style = LineStyle::Dashed;
    }
    if cli.proportional {
        options.x_axis_spacing = XAxisSpacing::Proportional;
    }
    if cli.grams {
        options.weight_unit = WeightUnit::Gram;
    }
    if cli.mps {
        options.velocity_unit = VelocityUnit::Mps;
    }
    if let Some(title) = &cli.title {
        options.metadata.title = title.clone();
    }
    Ok(options)
}

fn apply_weights(set: &mut SeriesSet, cli: &Cli) -> Result<()> {
    if let Some(raw) = &cli.autofill {
        let values: Vec<f64> = parse_list(raw, "autofill value")?;
        let [start, interval] = values[..] else {
            bail!("--autofill expects START,INTERVAL");
        };
        let direction = if cli.decreasing {
            AutofillDirection::Decreasing
        } else {
            AutofillDirection::Increasing
        };
        set.autofill(start, interval, direction);
    }

    if let Some(raw) = &cli.weights {
        let weights: Vec<f64> = parse_list(raw, "charge weight")?;
        let numbers: Vec<u32> = set.enabled().map(|s| s.series_number).collect();
        if weights.len() != numbers.len() {
            bail!(
                "{} charge weights given for {} enabled series",
                weights.len(),
                numbers.len()
            );
        }
        for (number, weight) in numbers.into_iter().zip(weights) {
            set.set_charge_weight(number, weight)?;
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let candidates = scan_directory(&cli.dir)?;
    let candidate = pick_candidate(candidates, cli.source)?;
    tracing::info!("Using {candidate}");
    let source = candidate.to_string();

    let mut set = SeriesSet::new(candidate.series);
    if let Some(raw) = &cli.disable {
        for number in parse_list::<u32>(raw, "series number")? {
            set.set_series_enabled(number, false)?;
        }
    }
    if cli.round_robin {
        set.round_robin()?;
    }
    apply_weights(&mut set, &cli)?;

    for s in set.enabled() {
        tracing::info!("{} ({}): {}", s.display_name, s.charge_weight, s.summary());
    }

    let options = load_options(&cli)?;
    let chart = set.build_chart(&options)?;

    let export = cli.image.as_deref().map(|p| {
        let (format, path) = ExportFormat::for_path(p);
        ExportTarget { format, path }
    });

    let json = serde_json::to_string_pretty(&Output {
        source,
        export,
        chart: &chart,
    })?;

    if cli.output.as_os_str() == "-" {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{json}")?;
    } else {
        fs::write(&cli.output, json)
            .with_context(|| format!("failed to write {}", cli.output.display()))?;
        tracing::info!("Chart written to {:?}", cli.output);
    }
    Ok(())
}
