//! Command line interface for generating a command line completion script.

use super::build;
use clap::{self, value_parser, Arg, ArgMatches, Command};
use clap_complete::Shell;
use std::io;

/// Creates a subcommand for generating a completion script.
pub fn create_completions_subcommand() -> Command {
    Command::new("completions")
        .about("Generate tab-completion script for your shell")
        .hide(true)
        .arg(
            Arg::new("shell")
                .value_name("SHELL")
                .required(true)
                .value_parser(value_parser!(Shell))
                .help("The shell to generate the script for"),
        )
        .after_help(
            "The script is written to standard output. For Bash, install it with e.g.\n\n    \
             tractwarp completions bash > ~/.local/share/bash-completion/completions/tractwarp",
        )
}

/// Runs the actions for the `completions` subcommand using the given arguments.
pub fn run_completions_subcommand(arguments: &ArgMatches) {
    let shell = *arguments
        .get_one::<Shell>("shell")
        .expect("No value for required argument");
    clap_complete::generate(
        shell,
        &mut build::build(),
        clap::crate_name!(),
        &mut io::stdout(),
    );
}
