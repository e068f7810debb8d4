use anyhow::{Context, Result};
use clap::Parser;
use rlbins::binning::binner::REPORT_EVERY_N;
use rlbins::binning::table::LengthPolicy;
use rlbins::plot::style::{comparison_figure_path, group_figure_path};
use rlbins::report::GroupReport;
use rlbins::stats::band::BandMethod;
use rlbins::{plot_comparison, plot_group, Binner, BinnerConfig, GroupComparisonInput, PlotConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "rlbins", author, version, about = "Plot groups of experimental runs", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "output", env = "RLBINS_DIRECTORY", help = "Directory holding the run files; figures are written there too")]
    directory: PathBuf,

    #[arg(short = 'p', long = "prefix", default_value = "sarsa_nep_434", help = "Run file prefix; repeat to also draw a comparison of the groups")]
    prefixes: Vec<String>,

    #[arg(short = 'x', long, default_value_t = 12.0, help = "Figure width in inches")]
    fig_size_x: f64,

    #[arg(short = 'y', long, default_value_t = 5.0, help = "Figure height in inches")]
    fig_size_y: f64,

    #[arg(short, long, default_value_t = REPORT_EVERY_N, env = "RLBINS_BUCKETS", help = "Average data into buckets of N rows, use 0 for no averaging")]
    buckets: usize,

    #[arg(long, help = "Truncate runs to the shortest one instead of failing")]
    truncate: bool,

    #[arg(long, help = "Normal-approximation bands instead of bootstrap")]
    normal: bool,

    #[arg(long, help = "Print a JSON summary of every group to stdout")]
    report: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> Result<()> {
    let mut binner_config = BinnerConfig::new();
    binner_config.set_buckets(args.buckets);
    if args.truncate {
        binner_config.set_length_policy(LengthPolicy::Truncate);
    }

    let mut plot_config = PlotConfig::new();
    plot_config.set_fig_size(args.fig_size_x, args.fig_size_y);
    if args.normal {
        plot_config.set_band_method(BandMethod::Normal);
    }

    let binner = Binner::new(&binner_config);
    let mut groups = Vec::with_capacity(args.prefixes.len());
    let mut reports = Vec::new();
    for prefix in &args.prefixes {
        let binned = binner
            .bin(&args.directory, prefix)
            .with_context(|| format!("binning group '{}'", prefix))?;
        let bands = plot_group(
            &binned,
            prefix,
            &group_figure_path(&args.directory, prefix),
            &plot_config,
        )
        .with_context(|| format!("plotting group '{}'", prefix))?;
        if args.report {
            reports.push(GroupReport::new(&binned, bands));
        }
        groups.push(binned);
    }

    if groups.len() > 1 {
        let input = GroupComparisonInput::new(groups);
        let min_length = input.min_length();
        let aligned = input
            .groups()
            .iter()
            .map(|group| {
                if group.n_runs() > min_length {
                    tracing::warn!(
                        prefix = group.prefix(),
                        runs = group.n_runs(),
                        kept = min_length,
                        "dropping runs to match the smallest group"
                    );
                }
                group.take_runs(min_length)
            })
            .collect();
        plot_comparison(
            &GroupComparisonInput::with_keys(aligned, input.keys().to_vec()),
            &comparison_figure_path(&args.directory),
            &plot_config,
        )
        .context("plotting group comparison")?;
    }

    if args.report {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("rlbins={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
