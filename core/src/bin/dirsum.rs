use bidskit_core::checksum::compare_directories;
use bidskit_core::cli::DirsumCli;
use clap::Parser;
use log::{error, info};
use std::process;

fn main() {
    let cli = DirsumCli::parse();

    setup_logging(cli.verbose);

    for dir in [&cli.first, &cli.second] {
        if !dir.is_dir() {
            eprintln!("Error: {} is not a directory", dir.display());
            process::exit(1);
        }
    }

    info!("Using {:?} checksums", cli.algorithm);

    let comparison = match compare_directories(&cli.first, &cli.second, cli.algorithm) {
        Ok(comparison) => comparison,
        Err(e) => {
            error!("Failed to compare directories: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if cli.verbose {
        println!("{:#}", comparison);
    } else {
        println!("{}", comparison);
    }

    if !comparison.is_identical() {
        process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}
