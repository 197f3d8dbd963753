/// volctl - apply gain or loudness control to raw PCM files
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use volctl_cli::{process_file, CliConfig, CliOverrides};
use gst::prelude::*;
use volctl_filter::ElementKind;

#[derive(Parser)]
#[command(name = "volctl")]
#[command(about = "In-place gain and EBU R128 loudness control for raw PCM", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a raw PCM file through an element
    Process {
        /// Input file with interleaved samples
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Element to run (volume or ebur128control)
        #[arg(short, long)]
        element: Option<String>,
        /// Linear volume for the volume element
        #[arg(long)]
        volume: Option<f64>,
        /// Measured integrated loudness in LUFS
        #[arg(long, allow_hyphen_values = true)]
        integrated_loudness: Option<f64>,
        /// Target loudness in LUFS
        #[arg(long, allow_hyphen_values = true)]
        target_level: Option<f64>,
        /// Sample format, e.g. F32LE
        #[arg(short, long)]
        format: Option<String>,
        /// Sample rate in Hz
        #[arg(long)]
        rate: Option<u32>,
        /// Interleaved channel count
        #[arg(long)]
        channels: Option<u32>,
        /// Frames per buffer
        #[arg(long)]
        buffer_frames: Option<u32>,
    },
    /// Show element details
    Inspect {
        /// Element to describe; all elements when omitted
        element: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "volctl=info,volctl_cli=info,volctl_filter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    gst::init().context("Failed to initialize GStreamer")?;
    volctl_filter::register_static().context("Failed to register elements")?;

    match cli.command {
        Commands::Process {
            input,
            output,
            config,
            element,
            volume,
            integrated_loudness,
            target_level,
            format,
            rate,
            channels,
            buffer_frames,
        } => {
            let overrides = CliOverrides {
                element,
                volume,
                integrated_loudness_lufs: integrated_loudness,
                target_level_lufs: target_level,
                format,
                rate,
                channels,
                buffer_frames,
            };
            let config = CliConfig::load(config.as_deref(), &overrides)
                .context("Failed to load configuration")?;

            let stats = process_file(&config, &input, &output)
                .with_context(|| format!("Failed to process {}", input.display()))?;
            println!(
                "Processed {} buffers ({} bytes, {} silent)",
                stats.buffers, stats.bytes, stats.gap_buffers
            );
        }
        Commands::Inspect { element } => {
            let kinds = match element {
                Some(name) => vec![ElementKind::from_factory_name(&name)
                    .with_context(|| format!("Unknown element: {name}"))?],
                None => ElementKind::ALL.to_vec(),
            };
            for kind in kinds {
                inspect(kind)?;
            }
        }
    }

    Ok(())
}

fn inspect(kind: ElementKind) -> anyhow::Result<()> {
    let factory = gst::ElementFactory::find(kind.factory_name())
        .with_context(|| format!("{} is not registered", kind.factory_name()))?;

    println!("Factory:        {}", factory.name());
    println!("Long name:      {}", factory.longname());
    println!("Classification: {}", factory.klass());
    println!("Description:    {}", factory.description());
    println!("Author:         {}", factory.author());
    println!("Pad templates:");
    for template in factory.static_pad_templates() {
        println!(
            "  {:<26} {:?}: {}",
            template.name_template(),
            template.direction(),
            template.caps()
        );
    }
    println!("Properties:");
    for spec in kind.property_specs() {
        println!(
            "  {:<26} {}: {} [{} .. {}] default {}",
            spec.name, spec.nick, spec.blurb, spec.minimum, spec.maximum, spec.default
        );
    }
    println!();
    Ok(())
}
