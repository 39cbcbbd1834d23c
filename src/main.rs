use clap::Parser;
use linkshelf::cli::Cli;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
