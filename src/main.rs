//! Paranoid Audit CLI
//!
//! Generates random strings and audits the generator: `audit` runs the
//! full battery once, `generate` prints samples, `calibrate` repeats the
//! chi-squared audit to measure its false-positive rate.

use clap::{Args, Parser, Subcommand, ValueEnum};
use paranoid_audit::{
    analysis::Calibration,
    audit::run_audit,
    breach::OfflineLookup,
    config::FileConfig,
    metrics::MetricsRegistry,
    sampler::{CharsetPreset, Sampler},
    source::{ByteSource, OsByteSource, SeededByteSource},
    Fingerprint, Verdict,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "paranoid-audit", version, about = "Generate random strings and audit the generator")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate one sample plus an audit batch and run every check.
    Audit {
        #[command(flatten)]
        generator: GeneratorArgs,

        /// Report format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also print Prometheus metrics for the run.
        #[arg(long)]
        metrics: bool,
    },
    /// Print samples, one per line.
    Generate {
        #[command(flatten)]
        generator: GeneratorArgs,

        /// Number of samples.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Print each sample's fingerprint (SHA-256 or BLAKE3, per config).
        #[arg(long)]
        fingerprint: bool,
    },
    /// Repeat the chi-squared audit over fresh batches. Ctrl-C stops early.
    Calibrate {
        #[command(flatten)]
        generator: GeneratorArgs,

        /// Number of batches to audit.
        #[arg(short, long, default_value_t = 1000)]
        rounds: u64,

        /// Also print Prometheus metrics for the run.
        #[arg(long)]
        metrics: bool,
    },
}

/// Overrides for the `[generator]` section.
#[derive(Args)]
struct GeneratorArgs {
    #[arg(long, value_enum)]
    charset: Option<CharsetPreset>,

    /// Printable-ASCII symbols to use instead of a preset.
    #[arg(long)]
    custom_charset: Option<String>,

    #[arg(short, long)]
    length: Option<usize>,

    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Use a seeded ChaCha20 source (reproducible, not for real secrets).
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Toml,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Paranoid Audit v{}", paranoid_audit::VERSION);

    let base = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load {}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        },
        None => FileConfig::default(),
    };

    match cli.command {
        Command::Audit {
            generator,
            format,
            metrics,
        } => with_config(base, &generator, |config| audit(config, format, metrics)),
        Command::Generate {
            generator,
            count,
            fingerprint,
        } => with_config(base, &generator, |config| generate(config, count, fingerprint)),
        Command::Calibrate {
            generator,
            rounds,
            metrics,
        } => with_config(base, &generator, |config| calibrate(config, rounds, metrics)),
    }
}

fn with_config(
    mut config: FileConfig,
    args: &GeneratorArgs,
    run: impl FnOnce(&FileConfig) -> Result<ExitCode, String>,
) -> ExitCode {
    let g = &mut config.generator;
    if let Some(charset) = args.charset {
        g.charset = charset;
        g.custom_charset = None;
    }
    if let Some(custom) = &args.custom_charset {
        g.custom_charset = Some(custom.clone());
    }
    if let Some(length) = args.length {
        g.length = length;
    }
    if let Some(batch_size) = args.batch_size {
        g.batch_size = batch_size;
    }
    if args.seed.is_some() {
        g.seed = args.seed;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::from(2);
    }

    match run(&config) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(2)
        }
    }
}

fn sampler_for(config: &FileConfig) -> Sampler<Box<dyn ByteSource>> {
    let source: Box<dyn ByteSource> = match config.generator.seed {
        Some(seed) => {
            warn!(seed, "Using a seeded source; output is reproducible");
            Box::new(SeededByteSource::from_u64(seed))
        }
        None => Box::new(OsByteSource::new()),
    };
    Sampler::new(source)
}

fn audit(config: &FileConfig, format: OutputFormat, metrics: bool) -> Result<ExitCode, String> {
    let mut sampler = sampler_for(config);
    let run = run_audit(config, &mut sampler, &OfflineLookup).map_err(|e| e.to_string())?;

    println!("{}", run.sample);
    match format {
        OutputFormat::Text => println!("{}", run.report),
        OutputFormat::Toml => println!("{}", run.report.to_toml().map_err(|e| e.to_string())?),
    }

    if metrics {
        let registry = MetricsRegistry::new().map_err(|e| e.to_string())?;
        registry.record_report(&run.report);
        print!("{}", registry.encode().map_err(|e| e.to_string())?);
    }

    Ok(match run.report.verdict {
        Verdict::Fail => ExitCode::FAILURE,
        Verdict::Pass | Verdict::Warn => ExitCode::SUCCESS,
    })
}

fn generate(config: &FileConfig, count: usize, fingerprint: bool) -> Result<ExitCode, String> {
    let alphabet = config.generator.alphabet().map_err(|e| e.to_string())?;
    let mut sampler = sampler_for(config);
    let length = config.generator.length;

    for _ in 0..count {
        let sample = if config.requirements.is_empty() {
            sampler.generate(length, &alphabet)
        } else {
            sampler.generate_constrained(length, &alphabet, &config.requirements)
        }
        .map_err(|e| e.to_string())?;

        if fingerprint {
            let digest = Fingerprint::of(&sample, config.generator.fingerprint);
            println!("{}  {}", sample, digest);
        } else {
            println!("{}", sample);
        }
    }

    info!(
        count,
        rejected = sampler.stats().bytes_rejected,
        drawn = sampler.stats().bytes_drawn,
        "Generation complete"
    );
    Ok(ExitCode::SUCCESS)
}

fn calibrate(config: &FileConfig, rounds: u64, metrics: bool) -> Result<ExitCode, String> {
    let alphabet = config.generator.alphabet().map_err(|e| e.to_string())?;
    let mut sampler = sampler_for(config);

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .map_err(|e| format!("failed to install Ctrl-C handler: {}", e))?;

    let mut calibration = Calibration::new(config.thresholds);
    let summary = calibration
        .run(
            &mut sampler,
            &alphabet,
            config.generator.batch_size,
            config.generator.length,
            rounds,
            &stop,
        )
        .map_err(|e| e.to_string())?;

    println!(
        "rounds={} rejections={} rate={:.4} expected={:.4} {}{}",
        summary.rounds,
        summary.rejections,
        summary.rejection_rate,
        summary.expected_rate,
        if summary.consistent { "consistent" } else { "INCONSISTENT" },
        if summary.interrupted { " (interrupted)" } else { "" }
    );

    if metrics {
        let registry = MetricsRegistry::new().map_err(|e| e.to_string())?;
        registry.record_calibration(&summary);
        print!("{}", registry.encode().map_err(|e| e.to_string())?);
    }

    Ok(if summary.consistent {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
