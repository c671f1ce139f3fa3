//! CLI entry point for string art generation

use clap::Parser;
use stringloom::io::cli::{Cli, FileProcessor};

fn main() -> stringloom::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let mut processor = FileProcessor::new(cli);
    processor.process()
}
