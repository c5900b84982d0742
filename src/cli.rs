use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use idmd::config::{AppSettings, load_app_config};
use idmd::data::{self, Distribution};
use idmd::manipulation::{Operation, OperationPipeline, ReplacementSpec};
use idmd::report::{self, ReportOptions, ReportSelection};
use idmd::session::Session;
use idmd::viz;
use rand::SeedableRng as _;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "idmd",
    version,
    about = "Explore tabular data: reshape columns, replace values, chart and report"
)]
pub struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true, env = "IDMD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DistributionKind {
    Normal,
    Uniform,
    Integers,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PlotKind {
    Line,
    Bar,
    Heatmap,
    Histogram,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a synthetic dataset and save it as CSV
    Generate {
        #[arg(short, long, value_enum, default_value = "normal")]
        distribution: DistributionKind,

        #[arg(long, default_value_t = 100)]
        rows: usize,

        #[arg(long, default_value_t = 3)]
        cols: usize,

        /// Mean of the normal distribution
        #[arg(long)]
        mean: Option<f64>,

        /// Standard deviation of the normal distribution
        #[arg(long)]
        std: Option<f64>,

        /// Lower bound (inclusive) for uniform and integer draws
        #[arg(long)]
        low: Option<f64>,

        /// Upper bound (exclusive) for uniform and integer draws
        #[arg(long)]
        high: Option<f64>,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print a preview, summary statistics and column metadata
    Describe {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Apply column and value operations, then save as CSV.
    ///
    /// Operations from --ops run first, then swaps, replacements, drops and
    /// finally the selection.
    Process {
        #[arg(short, long)]
        input: PathBuf,

        /// Swap two columns, e.g. `--swap a,b` (repeatable)
        #[arg(long, value_name = "A,B")]
        swap: Vec<String>,

        /// Replace values, e.g. `--replace price:0:median` (repeatable)
        #[arg(long, value_name = "COL:SELECTOR:POLICY")]
        replace: Vec<String>,

        /// Drop a column (repeatable)
        #[arg(long)]
        drop: Vec<String>,

        /// Keep only these columns, in this order
        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,

        /// JSON file with a list of operations
        #[arg(long)]
        ops: Option<PathBuf>,

        /// Output CSV. Defaults to the configured export file name.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render one chart to SVG
    Plot {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long, value_enum)]
        kind: PlotKind,

        /// Columns to chart. Defaults to the first numeric columns.
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Build the three-page report and write it as one PDF
    Report {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long, value_delimiter = ',')]
        plot_columns: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        heatmap_columns: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        hist_columns: Vec<String>,

        /// Output PDF, or a directory to write `data_report.pdf` into
        #[arg(short, long, default_value = report::DEFAULT_REPORT_FILE)]
        output: PathBuf,
    },
}

pub fn run_command(command: Commands, settings: &AppSettings) -> Result<()> {
    match command {
        Commands::Generate {
            distribution,
            rows,
            cols,
            mean,
            std,
            low,
            high,
            seed,
            output,
        } => {
            let distribution = build_distribution(distribution, mean, std, low, high)?;
            handle_generate(distribution, rows, cols, seed, &output)
        }
        Commands::Describe { input } => handle_describe(&input, settings),
        Commands::Process {
            input,
            swap,
            replace,
            drop,
            select,
            ops,
            output,
        } => {
            let mut operations = match ops {
                Some(path) => load_operations(&path)?,
                None => Vec::new(),
            };
            operations.extend(cli_operations(&swap, &replace, &drop, select)?);
            let output = output.unwrap_or_else(|| PathBuf::from(&settings.export_file_name));
            handle_process(&input, &operations, &output)
        }
        Commands::Plot {
            input,
            kind,
            columns,
            output,
        } => handle_plot(&input, kind, columns, &output, settings),
        Commands::Report {
            input,
            plot_columns,
            heatmap_columns,
            hist_columns,
            output,
        } => {
            let selection = ReportSelection {
                plot_columns: non_empty(plot_columns),
                heatmap_columns: non_empty(heatmap_columns),
                hist_columns: non_empty(hist_columns),
            };
            handle_report(&input, &selection, &output, settings)
        }
    }
}

fn non_empty(columns: Vec<String>) -> Option<Vec<String>> {
    (!columns.is_empty()).then_some(columns)
}

fn build_distribution(
    kind: DistributionKind,
    mean: Option<f64>,
    std: Option<f64>,
    low: Option<f64>,
    high: Option<f64>,
) -> Result<Distribution> {
    Ok(match kind {
        DistributionKind::Normal => Distribution::Normal {
            mean: mean.unwrap_or(0.0),
            std: std.unwrap_or(1.0),
        },
        DistributionKind::Uniform => Distribution::Uniform {
            low: low.unwrap_or(0.0),
            high: high.unwrap_or(1.0),
        },
        DistributionKind::Integers => Distribution::RandomInteger {
            low: integer_bound(low, 0, "low")?,
            high: integer_bound(high, 100, "high")?,
        },
    })
}

fn integer_bound(value: Option<f64>, default: i64, name: &str) -> Result<i64> {
    let Some(v) = value else {
        return Ok(default);
    };
    if v.fract() != 0.0 || !v.is_finite() {
        anyhow::bail!("--{name} must be a whole number for integer draws, got {v}");
    }
    Ok(v as i64)
}

fn handle_generate(
    distribution: Distribution,
    rows: usize,
    cols: usize,
    seed: Option<u64>,
    output: &Path,
) -> Result<()> {
    let df = match seed {
        Some(seed) => {
            data::generate_with_rng(distribution, rows, cols, &mut StdRng::seed_from_u64(seed))?
        }
        None => data::generate(distribution, rows, cols)?,
    };
    data::save_csv(&df, output).with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!("Generated {rows}x{cols} {} dataset", distribution.label());
    println!("Wrote {} rows to {}", df.height(), output.display());
    Ok(())
}

fn load_input(path: &Path) -> Result<polars::prelude::DataFrame> {
    data::load_df(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn handle_describe(input: &Path, settings: &AppSettings) -> Result<()> {
    let df = load_input(input)?;
    println!("{} rows × {} columns\n", df.height(), df.width());
    println!("{}", data::preview(&df, settings.preview_rows)?.to_markdown());

    let stats = data::describe(&df)?;
    if stats.is_empty() {
        println!("No numeric columns.\n");
    } else {
        let decimals = settings.stats_decimals as usize;
        println!("{}", data::summary_table(&stats, decimals).to_markdown());
    }

    println!(
        "{}",
        data::column_info_table(&data::column_info(&df)).to_markdown()
    );
    Ok(())
}

fn load_operations(path: &Path) -> Result<Vec<Operation>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let pipeline = OperationPipeline::from_json(&json)?;
    Ok(pipeline.operations().to_vec())
}

fn cli_operations(
    swap: &[String],
    replace: &[String],
    drop: &[String],
    select: Vec<String>,
) -> Result<Vec<Operation>> {
    let mut ops = Vec::new();
    for pair in swap {
        let (a, b) = pair
            .split_once(',')
            .with_context(|| format!("--swap expects A,B, got '{pair}'"))?;
        ops.push(Operation::Swap {
            a: a.trim().to_owned(),
            b: b.trim().to_owned(),
        });
    }
    for spec in replace {
        let spec: ReplacementSpec = spec
            .parse()
            .with_context(|| format!("Invalid --replace '{spec}'"))?;
        ops.push(Operation::Replace(spec));
    }
    for column in drop {
        ops.push(Operation::Drop {
            column: column.clone(),
        });
    }
    if !select.is_empty() {
        ops.push(Operation::Select { columns: select });
    }
    Ok(ops)
}

fn handle_process(input: &Path, operations: &[Operation], output: &Path) -> Result<()> {
    let mut session = Session::new(load_input(input)?);
    session.apply_all(operations)?;

    for line in session.history() {
        println!("  {line}");
    }
    data::save_csv(session.current(), output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!("Applied {} operations", session.operations().len());
    println!(
        "Wrote {} rows × {} columns to {}",
        session.current().height(),
        session.current().width(),
        output.display()
    );
    Ok(())
}

fn handle_plot(
    input: &Path,
    kind: PlotKind,
    columns: Vec<String>,
    output: &Path,
    settings: &AppSettings,
) -> Result<()> {
    let df = load_input(input)?;
    let columns = if columns.is_empty() {
        idmd::utils::numeric_column_names(&df)
            .into_iter()
            .take(settings.report_fallback_columns)
            .collect()
    } else {
        columns
    };

    let figure = match kind {
        PlotKind::Line => viz::line_plot(&df, &columns)?,
        PlotKind::Bar => {
            let column = columns
                .first()
                .context("bar plots need a column (--columns)")?;
            viz::bar_plot(&df, column)?
        }
        PlotKind::Heatmap => viz::correlation_heatmap(&df, &columns)?,
        PlotKind::Histogram => {
            viz::histograms_with_width(&df, &columns, settings.histogram_grid_width)?
        }
    };

    let (width, height) = settings.figure_size();
    let svg = figure.render_svg(width, height)?;
    std::fs::write(output, svg).with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {kind:?} chart to {}", output.display());
    Ok(())
}

fn handle_report(
    input: &Path,
    selection: &ReportSelection,
    output: &Path,
    settings: &AppSettings,
) -> Result<()> {
    let df = load_input(input)?;
    let report = report::build_report_with(&df, selection, &ReportOptions::from(settings))?;
    let path = report::save_report(&report, output, &settings.page_size())
        .with_context(|| format!("Failed to write report to {}", output.display()))?;
    println!("Wrote {}-page report to {}", report.pages.len(), path.display());
    Ok(())
}

/// Settings from `--config`, or the default location.
pub fn settings_for(cli: &Cli) -> AppSettings {
    load_app_config(cli.config.as_deref())
}
