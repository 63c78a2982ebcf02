use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Parser, Debug)]
#[command(name = "manimal", version, about = "Render and publish lesson animation clips")]
struct Cli {
    #[command(flatten)]
    paths: PathArgs,

    /// Catalog JSON (`{ topic: { file: [entry, ...] } }`). Defaults to the built-in catalog.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// More log output (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct PathArgs {
    /// Scene sources, one subdirectory per topic.
    #[arg(long, global = true, default_value = "scenes")]
    scenes_dir: PathBuf,

    /// Working output area for rendered clips.
    #[arg(long, global = true, default_value = "generated")]
    output_dir: PathBuf,

    /// Delivery folder read by the web app.
    #[arg(long, global = true, default_value = "../apps/org/public/visuals")]
    publish_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the selected entries, publish them and rewrite the manifest.
    Generate(GenerateArgs),
    /// Print the catalog.
    List,
    /// Check that the renderer runs and every catalog source file exists.
    Check(RendererArgs),
    /// Rewrite the manifest from the publish directory without rendering.
    Manifest,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Only entries from this topic (e.g. neural_network).
    #[arg(short, long)]
    topic: Option<String>,

    /// Only entries from this source file (e.g. text_encoder.py).
    #[arg(short, long)]
    file: Option<String>,

    /// Only this entry (e.g. TextEncoderExplained).
    #[arg(short, long)]
    scene: Option<String>,

    #[command(flatten)]
    renderer: RendererArgs,
}

#[derive(Args, Debug)]
struct RendererArgs {
    /// Renderer executable.
    #[arg(long, default_value = "manim")]
    renderer: PathBuf,

    /// Render quality preset.
    #[arg(long, value_enum, default_value_t = QualityChoice::Low)]
    quality: QualityChoice,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QualityChoice {
    Low,
    Medium,
    High,
    Production,
    #[value(name = "4k")]
    FourK,
}

impl From<QualityChoice> for manimal::Quality {
    fn from(q: QualityChoice) -> Self {
        match q {
            QualityChoice::Low => manimal::Quality::Low,
            QualityChoice::Medium => manimal::Quality::Medium,
            QualityChoice::High => manimal::Quality::High,
            QualityChoice::Production => manimal::Quality::Production,
            QualityChoice::FourK => manimal::Quality::FourK,
        }
    }
}

impl RendererArgs {
    fn renderer(&self) -> manimal::ManimRenderer {
        manimal::ManimRenderer::new(manimal::RendererConfig {
            program: self.renderer.clone(),
            quality: self.quality.into(),
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let catalog = load_catalog(cli.catalog.as_ref())?;
    let cfg = manimal::DriverConfig {
        scenes_dir: cli.paths.scenes_dir,
        output_dir: cli.paths.output_dir,
        publish_dir: cli.paths.publish_dir,
    };

    match cli.cmd {
        Command::Generate(args) => cmd_generate(&cfg, &catalog, args),
        Command::List => {
            print!("{}", catalog.tree());
            Ok(())
        }
        Command::Check(args) => cmd_check(&cfg, &catalog, &args),
        Command::Manifest => cmd_manifest(&cfg),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

fn load_catalog(path: Option<&PathBuf>) -> anyhow::Result<manimal::Catalog> {
    match path {
        Some(p) => manimal::Catalog::from_path(p)
            .with_context(|| format!("load catalog '{}'", p.display())),
        None => Ok(manimal::Catalog::builtin()),
    }
}

fn cmd_generate(
    cfg: &manimal::DriverConfig,
    catalog: &manimal::Catalog,
    args: GenerateArgs,
) -> anyhow::Result<()> {
    let criteria = manimal::SelectionCriteria {
        topic: args.topic,
        file: args.file,
        entry: args.scene,
    };
    let mut renderer = args.renderer.renderer();

    match manimal::run(cfg, catalog, &criteria, &mut renderer) {
        manimal::RunOutcome::NothingSelected { .. } => {
            println!("no entries found matching the criteria");
        }
        manimal::RunOutcome::Completed(report) => {
            for f in &report.failures {
                eprintln!("failed: {f}");
            }
            if let Some(manimal::PublishOutcome::Copied { failures, .. }) = &report.publish {
                for f in failures {
                    eprintln!("not published: {}: {}", f.path.display(), f.reason);
                }
            }
            println!("{}", report.summary());
            if let Some(manimal::ManifestOutcome::Written { path, .. }) = &report.manifest {
                println!("manifest: {}", path.display());
            }
        }
    }
    Ok(())
}

fn cmd_check(
    cfg: &manimal::DriverConfig,
    catalog: &manimal::Catalog,
    args: &RendererArgs,
) -> anyhow::Result<()> {
    let renderer = args.renderer();
    let version = renderer.probe()?;
    println!("renderer: {version}");

    let missing = cfg.missing_sources(catalog);
    for p in &missing {
        println!("missing: {}", p.display());
    }
    if !missing.is_empty() {
        anyhow::bail!("{} catalog source file(s) missing", missing.len());
    }
    println!("all {} entries have a source file", catalog.entry_count());
    Ok(())
}

fn cmd_manifest(cfg: &manimal::DriverConfig) -> anyhow::Result<()> {
    match manimal::write_manifest(&cfg.publish_dir)? {
        manimal::ManifestOutcome::Skipped { missing } => {
            println!(
                "publish directory '{}' not found, manifest not written",
                missing.display()
            );
        }
        manimal::ManifestOutcome::Written { path, .. } => {
            println!("manifest: {}", path.display());
        }
    }
    Ok(())
}
