use clap::Parser;

mod cli;

fn main() {
    env_logger::init();

    if let Err(e) = cli::run(cli::Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
