use std::error::Error;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use lca_report_visual::{run_pipeline, ReportConfig};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Generates an illustrative life-cycle-assessment report with charts.
///
/// Chart images and the PDF report are written to the output directory. Fonts must be present
/// under `assets/fonts` or provided via the `LCA_REPORT_FONTS_DIR` environment variable.
#[derive(Parser)]
#[command(author, version, about = "Generate a visual LCA report for a product")]
struct Cli {
    /// Name of the product the report is about.
    #[arg(short, long, default_value = "Electric Toothbrush")]
    product: String,

    /// Directory receiving the charts and the report.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Seed for reproducible inventory values.
    #[arg(long)]
    seed: Option<u64>,

    /// Date printed on the report (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Chart width in pixels.
    #[arg(long, default_value_t = 640)]
    chart_width: u32,

    /// Chart height in pixels.
    #[arg(long, default_value_t = 480)]
    chart_height: u32,
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = ReportConfig::new()
        .with_output_dir(&cli.output_dir)
        .with_chart_size(cli.chart_width, cli.chart_height)
        .with_report_date(cli.date);

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    println!("Generating data, charts, and professional report...");
    let output = run_pipeline(&cli.product, &config, &mut rng)?;
    for chart in &output.charts {
        debug!("chart: {}", chart.path.display());
    }

    let size = std::fs::metadata(&output.report_path)?.len();
    println!(
        "Report ready: {} ({} bytes)",
        output.report_path.display(),
        size
    );
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
