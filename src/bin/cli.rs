use clap::{Parser, Subcommand};
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;
use log::{LevelFilter, error, info};
use sheetdl::config::{Config, TableLayout};
use sheetdl::discover_tables;
use sheetdl::download::Downloader;
use sheetdl::remux::{PairExtensions, remux_all};
use sheetdl::Pipeline;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Clone)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long = "output-dir", short, global = true)]
    pub output_dir: Option<PathBuf>,

    #[arg(long = "table-format", value_enum, global = true)]
    pub table_format: Option<TableLayout>,

    #[arg(long = "yt-dlp", global = true)]
    pub yt_dlp: Option<PathBuf>,

    #[arg(long = "ffmpeg", global = true)]
    pub ffmpeg: Option<PathBuf>,

    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[arg(
        long = "verbosity",
        short,
        global = true,
        default_value = "info",
        value_parser = clap::builder::PossibleValuesParser::new([
            "info", "debug", "error", "none", "full"
        ])
    )]
    pub verbosity: String,
}

#[derive(Subcommand, Clone)]
pub enum Command {
    /// Download every row of the given tables (default: all *.csv in the current directory).
    Download { tables: Vec<PathBuf> },
    /// Merge video files with their same-named audio sidecars in the output directory.
    Remux,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Cli::parse();
    let progress = init_logging(&args.verbosity)?;

    let config_path = args.config.clone().or_else(Config::default_path);
    let mut config = config_path
        .as_deref()
        .map(Config::load)
        .unwrap_or_default();
    apply_overrides(&mut config, &args);

    match args.command {
        Command::Download { tables } => {
            let tables = if tables.is_empty() {
                discover_tables(&std::env::current_dir()?).await?
            } else {
                tables
            };
            if tables.is_empty() {
                return Err("No CSV files found in the current directory.".into());
            }

            let engine = config.fetch_engine()?;
            info!("Using {}", engine);

            let downloader = Downloader::new(
                Arc::new(engine),
                &config.output_dir,
                &config.temp_prefix,
                &config.merge_container,
            );
            let pipeline =
                Pipeline::new(downloader, config.table_format.format()).with_progress(progress);

            let report = pipeline.run(&tables).await;
            info!("Finished: {}", report);
        }
        Command::Remux => {
            let engine = config.mux_engine()?;
            info!("Using {}", engine);
            let extensions = PairExtensions {
                video: config.video_extension.clone(),
                audio: config.audio_extension.clone(),
            };

            match remux_all(&config.output_dir, &engine, &extensions).await {
                Ok(summary) => info!(
                    "Finished merging: {} merged, {} failed, {} video(s) scanned",
                    summary.merged,
                    summary.failed.len(),
                    summary.scanned
                ),
                Err(e) => error!("{}", e),
            }
        }
    }

    Ok(())
}

fn init_logging(verbosity: &str) -> Result<MultiProgress, Box<dyn std::error::Error + Send + Sync>> {
    let level = match verbosity {
        "debug" => LevelFilter::Debug,
        "error" => LevelFilter::Error,
        "none" => LevelFilter::Off,
        "full" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    let logger = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .build();
    let progress = MultiProgress::new();

    LogWrapper::new(progress.clone(), logger).try_init()?;
    log::set_max_level(level);

    Ok(progress)
}

fn apply_overrides(config: &mut Config, args: &Cli) {
    if let Some(output_dir) = &args.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(table_format) = args.table_format {
        config.table_format = table_format;
    }
    if args.yt_dlp.is_some() {
        config.yt_dlp = args.yt_dlp.clone();
    }
    if args.ffmpeg.is_some() {
        config.ffmpeg = args.ffmpeg.clone();
    }
}
