// Command line arguments

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{Config, DEFAULT_CONFIG_FILE};

/// Where trigger text comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Desktop clipboard, polled for changes
    Clipboard,
    /// One link per line on stdin
    Stdin,
}

#[derive(Debug, Parser)]
#[command(name = "tubemp3", version, about = "Copy YouTube links, get their audio")]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Trigger source to watch
    #[arg(long, value_enum, default_value_t = SourceKind::Clipboard)]
    pub source: SourceKind,

    /// Override maxConcurrentDownloads
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub max_downloads: Option<u16>,

    /// Override downloadRoot
    #[arg(long)]
    pub download_root: Option<PathBuf>,
}

impl Cli {
    /// Apply command-line overrides on top of the file configuration
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(n) = self.max_downloads {
            config.max_concurrent_downloads = n as usize;
        }
        if let Some(root) = &self.download_root {
            config.download_root = root.clone();
        }
        config
    }
}
