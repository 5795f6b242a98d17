mod renderer;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use phenomap_core::svg::render_svg;
use phenomap_core::{Heatmap, HeatmapConfig, HeatmapOptions, LoadOutcome};
use phenomap_protocol::HeaderKey;
use tracing_subscriber::EnvFilter;

/// Render a saved phenotype heatmap in the terminal, or as an SVG snapshot.
#[derive(Parser, Debug)]
#[command(name = "phenomap")]
#[command(version)]
struct Args {
    /// Heatmap JSON response saved from the service
    input: PathBuf,

    /// Gene (MGI accession) the heatmap belongs to
    #[arg(long, default_value = "local")]
    mgiid: String,

    /// Columns per section
    #[arg(long)]
    ncol: Option<usize>,

    /// Treat the file as an ontological (MP term) heatmap
    #[arg(long)]
    ontological: bool,

    /// Colour cells on a gradient instead of by threshold
    #[arg(long)]
    gradient: bool,

    /// Write an SVG snapshot to this path instead of opening the terminal UI
    #[arg(long)]
    svg: Option<PathBuf>,
}

/// Log to stderr, and only when `PHENOMAP_LOG` is set, so the terminal UI
/// stays clean.
fn init_tracing() {
    if let Ok(filter) = EnvFilter::try_from_env("PHENOMAP_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let data = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let options = HeatmapOptions {
        container: Some("terminal".to_string()),
        mgiid: Some(args.mgiid.clone()),
        mode: args.ontological.then(|| "ontological".to_string()),
        ncol: args.ncol,
        ..HeatmapOptions::default()
    };
    let viz = |gid: &HeaderKey, kind: &HeaderKey| format!("viz?gid={gid}&type={kind}");
    let config = HeatmapConfig::new(options, Some(Box::new(viz)))?;
    let mut heatmap = Heatmap::new(config);

    // The file stands in for the overview response.
    let request = heatmap.start();
    tracing::debug!(url = %request.url, "loading overview from file");
    if heatmap.on_matrix_bytes(request.generation, &data)? != LoadOutcome::Applied {
        bail!("matrix response was superseded");
    }
    heatmap.set_gradient(args.gradient);

    if let Some(path) = args.svg {
        let (width, height) = heatmap.grid_size();
        let svg = render_svg(&heatmap.render(), width, height);
        std::fs::write(&path, svg).with_context(|| format!("writing {}", path.display()))?;
        return Ok(());
    }

    renderer::render_tui(&mut heatmap)?;
    Ok(())
}
