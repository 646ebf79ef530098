use clap::Parser;

use neo_explorer::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    cli::run(cli)
}
