use clap::Parser;
use std::path::PathBuf;

/// Interactive student-persona assistant over a research paper.
#[derive(Parser, Debug)]
#[command(name = "socratic", version, about)]
pub struct Args {
    /// Path to the paper text the assistant studies
    pub document: PathBuf,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the sessions file from config
    #[arg(long)]
    pub sessions_file: Option<PathBuf>,

    /// Override the index cache directory from config
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}
