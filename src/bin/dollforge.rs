use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use tracing::{Level, info};

use dollforge::{
    OverrideHook, PartsSource, RuleHook, RunOptions, RunSession, export_config, load_config,
    load_metadata, replay_combinations, save_json,
};

#[derive(Parser, Debug)]
#[command(name = "dollforge", version)]
struct Cli {
    /// YAML config; components and layers are discovered from the data dir when absent.
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Directory holding one sub-directory of layer PNGs per component.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Output directory for generated images.
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,

    /// Pick items sequentially instead of by weighted sampling.
    #[arg(short = 's', long = "sequence", default_value_t = false)]
    sequence: bool,

    /// Write the effective config (after discovery) as YAML.
    #[arg(long)]
    export_config: Option<PathBuf>,

    /// Do not composite images; only metadata and statistics are produced.
    #[arg(long, default_value_t = false)]
    skip_images: bool,

    /// Replay the combinations recorded in a metadata JSON file.
    #[arg(long)]
    load_metadata: Option<PathBuf>,

    /// Write the metadata records of this run as JSON.
    #[arg(long)]
    save_metadata: Option<PathBuf>,

    /// Write per-item occurrence counts as JSON.
    #[arg(long)]
    save_statistics: Option<PathBuf>,

    /// 1-based id of the first item to generate.
    #[arg(long)]
    offset: Option<u64>,

    /// Number of items to generate.
    #[arg(long)]
    count: Option<u64>,

    /// Sampler seed (overrides the config seed).
    #[arg(long)]
    seed: Option<u64>,

    /// Scan for unused combinations once sampling stops finding new ones.
    #[arg(long, default_value_t = false)]
    exhaustive: bool,

    /// Log at debug level.
    #[arg(short = 'v', long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    let mut config = load_config(&cli.config, &cli.data_dir)?;
    if let Some(path) = &cli.export_config {
        export_config(&config, path)?;
        info!("exported config to {}", path.display());
    }
    config.prepare()?;

    let source = if let Some(path) = &cli.load_metadata {
        let records = load_metadata(path)?;
        let parts = replay_combinations(&config.components, &records)
            .with_context(|| format!("replay parts from '{}'", path.display()))?;
        info!(
            "loaded {} combinations from {}",
            parts.len(),
            path.display()
        );
        PartsSource::Replay(parts)
    } else if cli.sequence {
        PartsSource::Sequential
    } else {
        PartsSource::Random
    };

    let mut rng = match cli.seed.or(config.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let hook = RuleHook::from_config(&config);
    let mut session = RunSession::new(&config, &cli.data_dir, &cli.out_dir);
    if let Some(hook) = &hook {
        session = session.with_hook(hook as &dyn OverrideHook);
    }

    let options = RunOptions {
        offset: cli.offset,
        count: cli.count,
        skip_images: cli.skip_images,
        exhaustive: cli.exhaustive,
    };
    let report = session.run(&source, &options, &mut rng)?;

    if let Some(path) = &cli.save_metadata {
        save_json(&report.metadata, path)?;
        info!(
            "wrote {} metadata records to {}",
            report.metadata.len(),
            path.display()
        );
    }
    if let Some(path) = &cli.save_statistics {
        save_json(&report.statistics, path)?;
        info!("wrote statistics to {}", path.display());
    }

    info!(
        generated = report.generated,
        requested = report.requested,
        files = report.files_written,
        "done"
    );
    Ok(())
}
