use std::path::PathBuf;

use clap::Parser;
use docchat_config::DocchatConfig;

/// docchat: ask questions about your PDF documents.
#[derive(Parser, Debug)]
#[command(name = "docchat", version, about)]
pub struct Args {
    /// Port to listen on (overrides `server.port`).
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Address to bind (overrides `server.bind`).
    #[arg(long)]
    pub bind: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter override, e.g. `debug` or `docchat_ai=trace`.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut DocchatConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref bind) = self.bind {
            config.server.bind = bind.clone();
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
