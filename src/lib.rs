pub mod commands;
pub mod db;
pub mod models;
pub mod scanner;
pub mod settings;
pub mod utils;

use clap::Parser;

use commands::Args;

pub fn run() -> anyhow::Result<()> {
    // Info unless RUST_LOG says otherwise
    utils::logging::init();

    let args = Args::parse();
    log::debug!("sigscan starting with {:?}", args.command);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::execute(args, &mut out)
}
