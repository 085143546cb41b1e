//! Function for running the command line program.

use super::{
    build, completions::run_completions_subcommand, deform::run_deform_subcommand,
};
use clap::ArgMatches;
use std::time::Instant;

/// Runs the `tractwarp` command line program.
pub fn run() {
    run_with_args(build::build().get_matches());
}

/// Runs the `tractwarp` command line program with the given parsed arguments.
pub fn run_with_args(arguments: ArgMatches) {
    let start_instant = Instant::now();

    match arguments.subcommand() {
        Some(("deform", deform_arguments)) => run_deform_subcommand(deform_arguments),
        Some(("completions", completions_arguments)) => {
            run_completions_subcommand(completions_arguments)
        }
        _ => {}
    }

    if arguments.get_flag("timing") {
        println!("Elapsed time: {} s", start_instant.elapsed().as_secs_f64());
    }
}
