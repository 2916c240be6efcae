use std::error::Error;

use lca_report_visual::{run_pipeline, ReportConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

const OUTPUT_DIR: &str = "target/demo_reports";

fn main() -> Result<(), Box<dyn Error>> {
    let config = ReportConfig::new().with_output_dir(OUTPUT_DIR);
    let output = run_pipeline("Electric Toothbrush", &config, &mut StdRng::seed_from_u64(2024))?;

    for chart in &output.charts {
        println!("Chart {}", chart.path.display());
    }
    println!("Generated {}", output.report_path.display());
    Ok(())
}
