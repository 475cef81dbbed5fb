//! Prints the record of a coordinate-pair file nearest to a query point.

use clap::Parser;
use geosort_cli::{init_logging, run_nearest, NearestArgs};
use std::process;

fn main() {
    let args = NearestArgs::parse();
    init_logging(args.verbose);

    match run_nearest(&args) {
        Ok(Some(line)) => println!("{}", line),
        Ok(None) => {
            eprintln!("no record within {} km of {}", args.radius, args.location);
            process::exit(2);
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}
