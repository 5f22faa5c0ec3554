mod args;
mod ballot;

use clap::Parser;
use log::debug;

fn main() {
    let args = args::Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }
    debug!("args: {:?}", args);

    if let Err(e) = ballot::run_ballot(&args) {
        e.log("Error occurred");
        eprintln!("An error occurred: {}", e.console_message());
        std::process::exit(1);
    }
}
