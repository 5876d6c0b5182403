//! Binary entry point. See `lexanno --help`.

use clap::Parser;

fn main() {
    env_logger::init();

    let cli = lexanno::cli::Cli::parse();
    if let Err(err) = lexanno::cli::run(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
