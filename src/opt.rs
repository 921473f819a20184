use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "subjet-filter",
    about = "Find fat jets and their substructure in collider events"
)]
pub struct Opt {
    /// Configuration file in TOML format
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbosity level: 'off', 'error', 'warn', 'info', 'debug', 'trace'
    #[arg(short, long, default_value = "info")]
    pub verbosity: String,

    /// Event files with one particle `px py pz E` per line and events
    /// separated by empty lines
    pub files: Vec<PathBuf>,
}
