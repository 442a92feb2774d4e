//! Command-line entry point for pcm-convert.
//!
//! # Startup sequence
//!
//! 1. Parse the command line.
//! 2. Initialise logging (`RUST_LOG`, default `info`).
//! 3. Load [`AppConfig`] from `--config` or the platform config dir
//!    (defaults on first run); command-line flags override it.
//! 4. Create the [`tokio`] runtime (multi-thread, 2 workers).
//! 5. Spawn the conversion controller and send it one `Start` command.
//! 6. Forward Ctrl-C to [`ControllerHandle::stop`]; the partial result is
//!    still written.
//! 7. Print progress and diagnostics until the completion report arrives.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;

use pcm_convert::config::{AppConfig, AppPaths};
use pcm_convert::container::{read_wav, SourceClassification};
use pcm_convert::format::{ChannelLayout, ContainerKind, FormatDescriptor, SampleEncoding};
use pcm_convert::pipeline::{
    ControllerHandle, ConversionCommand, ConversionController, ConversionEvents, ConversionOutcome,
    ConversionRequest,
};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "pcm-convert")]
#[command(about = "Convert raw PCM and WAV audio between rates, encodings and channel layouts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert one file.
    Convert(ConvertArgs),
    /// Report how a file would be read.
    Probe {
        /// File to inspect.
        input: PathBuf,
    },
    /// Write the default settings file.
    InitConfig {
        /// Settings file to write instead of the platform default.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Source file (raw PCM or WAV).
    input: PathBuf,

    /// Source sample rate in Hz (raw PCM only).
    #[arg(long)]
    src_rate: Option<u32>,
    /// Source encoding: u8, s16, s32, s64, f32, f64 (raw PCM only).
    #[arg(long)]
    src_format: Option<SampleEncoding>,
    /// Source channel count: 1 or 2 (raw PCM only).
    #[arg(long)]
    src_channels: Option<ChannelLayout>,

    /// Destination sample rate in Hz.
    #[arg(long)]
    dst_rate: Option<u32>,
    /// Destination encoding.
    #[arg(long)]
    dst_format: Option<SampleEncoding>,
    /// Destination channel count.
    #[arg(long)]
    dst_channels: Option<ChannelLayout>,

    /// Output container: wav or pcm.
    #[arg(long)]
    container: Option<ContainerKind>,

    /// Directory for the converted file.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Settings file to read instead of the platform default.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ConvertArgs {
    /// Overlay the command-line flags on `config`.
    fn apply(&self, config: &mut AppConfig) {
        let src = &mut config.source;
        src.sample_rate = self.src_rate.unwrap_or(src.sample_rate);
        src.encoding = self.src_format.unwrap_or(src.encoding);
        src.channels = self.src_channels.unwrap_or(src.channels);

        let dst = &mut config.target;
        dst.sample_rate = self.dst_rate.unwrap_or(dst.sample_rate);
        dst.encoding = self.dst_format.unwrap_or(dst.encoding);
        dst.channels = self.dst_channels.unwrap_or(dst.channels);
        dst.container = self.container.unwrap_or(dst.container);

        if let Some(dir) = &self.output_dir {
            config.output.directory = Some(dir.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> AppConfig {
    let loaded = match path {
        Some(p) => AppConfig::load_from(p),
        None => AppConfig::load(),
    };
    loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    })
}

fn run_convert(args: ConvertArgs) -> Result<bool> {
    let mut config = load_config(args.config.as_deref());
    args.apply(&mut config);

    let source_format = config.source.descriptor().context("invalid source format")?;
    let target_format = config.target.descriptor().context("invalid destination format")?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let outcome = rt.block_on(async {
        let (controller, events) = ConversionController::from_config(&config);
        let handle = controller.handle();

        let request = ConversionRequest {
            source: controller.select_source(&args.input),
            source_format,
            target_format,
            target_container: config.target.container,
        };

        let (command_tx, command_rx) = mpsc::channel::<ConversionCommand>(1);
        let worker = tokio::spawn(controller.run(command_rx));
        command_tx
            .send(ConversionCommand::Start(request))
            .await
            .context("conversion controller is not running")?;
        drop(command_tx);

        tokio::spawn(stop_on_ctrl_c(handle));

        let outcome = drain_events(events).await;
        if let Err(e) = worker.await {
            log::error!("conversion controller panicked: {e}");
        }
        Ok::<_, anyhow::Error>(outcome)
    })?;

    match (&outcome.output, outcome.cancelled) {
        (Some(path), false) => println!("{}", path.display()),
        (Some(path), true) => println!("{} (stopped early, partial result)", path.display()),
        (None, _) => {}
    }
    Ok(outcome.success)
}

async fn stop_on_ctrl_c(handle: ControllerHandle) {
    if tokio::signal::ctrl_c().await.is_ok() {
        eprintln!("interrupted, stopping after the current chunk");
        handle.stop();
    }
}

/// Print progress in 10 % steps and every diagnostic message until the
/// completion report arrives.
async fn drain_events(mut events: ConversionEvents) -> ConversionOutcome {
    let mut last_step = None;
    loop {
        tokio::select! {
            Some(p) = events.progress.recv() => {
                let step = if p.total == 0 { 10 } else { p.done * 10 / p.total };
                if last_step != Some(step) {
                    last_step = Some(step);
                    eprintln!("progress: {:>3}% ({} / {} bytes)", step * 10, p.done, p.total);
                }
            }
            Some(text) = events.messages.recv() => {
                log::debug!("controller: {text}");
            }
            finished = events.finished.recv() => {
                // Whatever is still queued was sent before the outcome.
                while let Ok(text) = events.messages.try_recv() {
                    log::debug!("controller: {text}");
                }
                return finished.unwrap_or(ConversionOutcome {
                    success: false,
                    cancelled: false,
                    output: None,
                });
            }
        }
    }
}

fn run_probe(input: &Path) -> Result<bool> {
    let classification = pcm_convert::container::classify_path(input);
    println!("{}: {}", input.display(), classification.label());

    match classification {
        SourceClassification::Unreadable => Ok(false),
        SourceClassification::RawPcm => {
            let len = std::fs::metadata(input)?.len();
            println!("  {len} bytes of raw PCM (format must be given on conversion)");
            Ok(true)
        }
        SourceClassification::WavContainer => {
            let bytes = std::fs::read(input)
                .with_context(|| format!("cannot read {}", input.display()))?;
            match read_wav(&bytes) {
                Ok(wav) => {
                    print_wav(&wav.format, wav.data.len());
                    Ok(true)
                }
                Err(e) => {
                    println!("  header unusable ({e}); would be converted as raw PCM");
                    Ok(true)
                }
            }
        }
    }
}

fn print_wav(format: &FormatDescriptor, payload: usize) {
    println!("  format:   {format}");
    println!("  payload:  {payload} bytes");
    let frames = payload / format.frame_bytes();
    println!(
        "  duration: {:.3} s",
        frames as f64 / format.sample_rate() as f64
    );
    let playable = format.playback_compatible();
    if playable != *format {
        println!("  playback: {playable}");
    }
}

fn run_init_config(path: Option<PathBuf>) -> Result<bool> {
    let path = path.unwrap_or_else(|| AppPaths::new().settings_file);
    AppConfig::default()
        .save_to(&path)
        .with_context(|| format!("cannot write {}", path.display()))?;
    println!("{}", path.display());
    Ok(true)
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = match cli.command {
        Command::Convert(args) => run_convert(args),
        Command::Probe { input } => run_probe(&input),
        Command::InitConfig { config } => run_init_config(config),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
