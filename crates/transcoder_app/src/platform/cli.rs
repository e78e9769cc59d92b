use std::path::PathBuf;

use clap::Parser;

use super::config::AppConfig;
use super::logging::LogDestination;

/// Pick a video, transcode it to MP4 and save the result.
#[derive(Debug, Parser)]
#[command(name = "transcoder", version)]
pub struct Cli {
    /// RON configuration file. Defaults to ./transcoder.ron when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Video file to select once the engine is ready.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Directory downloads are saved into.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Where log output goes.
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,
}

impl Cli {
    /// Command-line flags win over the config file.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(destination) = self.log {
            config.log_destination = destination;
        }
    }
}
