//! Utilities for creating the command line interface.

use crate::{
    exit_on_false,
    geometry::{Dim3, In3D},
    io::{OverwriteMode, Verbosity},
    num::BFloat,
};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use indicatif::ProgressStyle;
use lazy_static::lazy_static;

lazy_static! {
    static ref DEFAULT_PROGRESS_STYLE: ProgressStyle = ProgressStyle::default_bar()
        .template("Progress: {bar:40}  {percent}% | ETA: {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
}

/// Whether infinite values are accepted for an argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllowInfinity {
    Yes,
    No,
}

/// Whether zero values are accepted for an argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllowZero {
    Yes,
    No,
}

/// Creates an argument taking three comma-separated floating point values.
pub fn create_3d_float_argument(name: &'static str, value_names: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .require_equals(true)
        .value_name(value_names)
        .value_delimiter(',')
        .allow_negative_numbers(true)
        .value_parser(value_parser!(f64))
}

/// Adds the `--overwrite` and `--no-overwrite` flags to the given command.
pub fn add_overwrite_arguments(command: Command) -> Command {
    command
        .arg(
            Arg::new("overwrite")
                .long("overwrite")
                .action(ArgAction::SetTrue)
                .help("Automatically overwrite any existing files"),
        )
        .arg(
            Arg::new("no-overwrite")
                .long("no-overwrite")
                .action(ArgAction::SetTrue)
                .conflicts_with("overwrite")
                .help("Do not overwrite any existing files"),
        )
}

/// Adds the `--verbose` and `--progress` flags to the given command.
pub fn add_verbosity_arguments(command: Command) -> Command {
    command
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Print status messages"),
        )
        .arg(
            Arg::new("progress")
                .short('p')
                .long("progress")
                .action(ArgAction::SetTrue)
                .help("Show progress bars and print status messages"),
        )
}

fn verify_finite_float_value<F: BFloat>(argument_name: &str, value: F) {
    exit_on_false!(value.is_finite(), "Error: {} must be finite", argument_name);
}

fn verify_argument_value_count<T>(argument_name: &str, values: &[T], required_count: usize) {
    let count = values.len();
    exit_on_false!(
        count == required_count,
        "Error: {} must have {} values, got {}",
        argument_name,
        required_count,
        count
    );
}

/// Returns the value of the given argument, or `None` if it was not given.
pub fn get_value_from_parseable_argument<T>(arguments: &ArgMatches, argument_name: &str) -> Option<T>
where
    T: Clone + Send + Sync + 'static,
{
    arguments.get_one::<T>(argument_name).cloned()
}

/// Returns the value of the given finite floating point argument, or `None`
/// if it was not given.
pub fn get_finite_float_value_from_parseable_argument(
    arguments: &ArgMatches,
    argument_name: &str,
) -> Option<f64> {
    get_value_from_parseable_argument::<f64>(arguments, argument_name).map(|value| {
        verify_finite_float_value(argument_name, value);
        value
    })
}

/// Returns the three values of the given floating point argument, or `None`
/// if it was not given.
pub fn parse_3d_float_values(
    arguments: &ArgMatches,
    argument_name: &str,
    allow_infinity: AllowInfinity,
    allow_zero: AllowZero,
) -> Option<In3D<f64>> {
    let values: Vec<f64> = arguments
        .get_many::<f64>(argument_name)?
        .copied()
        .collect();
    verify_argument_value_count(argument_name, &values, 3);
    let values = In3D::new(values[0], values[1], values[2]);

    exit_on_false!(
        Dim3::slice().into_iter().all(|dim| !values[dim].is_nan()),
        "Error: {} contains a NaN value",
        argument_name
    );

    exit_on_false!(
        allow_infinity == AllowInfinity::Yes
            || Dim3::slice().into_iter().all(|dim| values[dim].is_finite()),
        "Error: {} must be finite",
        argument_name
    );

    exit_on_false!(
        allow_zero == AllowZero::Yes || Dim3::slice().into_iter().all(|dim| values[dim] != 0.0),
        "Error: {} must be non-zero",
        argument_name
    );

    Some(values)
}

pub fn overwrite_mode_from_arguments(arguments: &ArgMatches) -> OverwriteMode {
    if arguments.get_flag("overwrite") {
        OverwriteMode::Always
    } else if arguments.get_flag("no-overwrite") {
        OverwriteMode::Never
    } else {
        OverwriteMode::Ask
    }
}

pub fn parse_verbosity(arguments: &ArgMatches, support_progress: bool) -> Verbosity {
    if support_progress && arguments.get_flag("progress") {
        Verbosity::Progress(DEFAULT_PROGRESS_STYLE.clone())
    } else if arguments.get_flag("verbose") || arguments.get_flag("progress") {
        Verbosity::Messages
    } else {
        Verbosity::Quiet
    }
}
