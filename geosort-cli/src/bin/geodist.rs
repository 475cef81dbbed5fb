//! Prints the great-circle distance between two points.

use clap::Parser;
use geosort_cli::{init_logging, run_dist, DistArgs};
use std::process;

fn main() {
    let args = DistArgs::parse();
    init_logging(args.verbose);

    match run_dist(&args) {
        Ok(line) => println!("{}", line),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}
