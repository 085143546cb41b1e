//! Function for building the command line hierarchy.

use super::{completions::create_completions_subcommand, deform::create_deform_subcommand};
use clap::{self, Arg, ArgAction, Command};

/// Build the `tractwarp` command line hierarchy.
pub fn build() -> Command {
    Command::new(clap::crate_name!())
        .version(clap::crate_version!())
        .author(clap::crate_authors!())
        .about(clap::crate_description!())
        .disable_help_subcommand(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("timing")
                .short('t')
                .long("timing")
                .action(ArgAction::SetTrue)
                .help("Display elapsed time when done"),
        )
        .subcommand(create_deform_subcommand())
        .subcommand(create_completions_subcommand())
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn command_hierarchy_is_consistent() {
        build().debug_assert();
    }
}
