//! Command line interface for deforming a tractogram with a displacement field.

use super::utils::{
    add_overwrite_arguments, add_verbosity_arguments, create_3d_float_argument,
    get_finite_float_value_from_parseable_argument, get_value_from_parseable_argument,
    overwrite_mode_from_arguments, parse_3d_float_values, parse_verbosity, AllowInfinity,
    AllowZero,
};
use crate::{
    exit_on_error, exit_on_false,
    geometry::{
        Dim3::{X, Y, Z},
        Point3, Vec3,
    },
    pipeline::{run_deformation, DeformationConfig},
};
use clap::{value_parser, Arg, ArgMatches, Command};
use std::path::PathBuf;

/// Creates a subcommand for deforming a tractogram.
pub fn create_deform_subcommand() -> Command {
    let command = Command::new("deform")
        .about("Deform a tractogram with a displacement field")
        .long_about(
            "Deform a tractogram with a displacement field.\n\
             The displacement field is read from a 4D .npy array with shape [nx, ny, nz, 3],\n\
             covering the region from the origin to voxel_extent * voxel_count along each axis.\n\
             Points outside the region are displaced by the value at the nearest boundary.\n\
             The tractogram is read from and written to JSON documents of the form\n\
             {\"header\": ..., \"streamlines\": [[[x, y, z], ...], ...]}.",
        )
        .arg(
            Arg::new("field-file")
                .value_name("FIELD_FILE")
                .help("Path to the displacement field (.npy)")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("tractogram-file")
                .value_name("TRACTOGRAM_FILE")
                .help("Path to the tractogram to deform")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output-file")
                .short('o')
                .long("output-file")
                .value_name("OUTPUT_FILE")
                .help(
                    "Path where the deformed tractogram should be written\n \
                     [default: input path with `_deformed` appended to the file stem]",
                )
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            create_3d_float_argument("voxel-extents", "DX,DY,DZ").help(
                "Extent of a field voxel along each axis\n \
                 [default: from <FIELD_FILE stem>.json sidecar if present, otherwise 1,1,1]",
            ),
        )
        .arg(
            create_3d_float_argument("test-point", "X,Y,Z")
                .help("Point whose displacement is reported before deforming [default: 120,120,120]"),
        )
        .arg(
            Arg::new("benchmark-points")
                .long("benchmark-points")
                .require_equals(true)
                .value_name("NUMBER")
                .help("Number of random points to deform for timing")
                .value_parser(value_parser!(usize))
                .default_value("1000"),
        )
        .arg(
            Arg::new("benchmark-upper-bound")
                .long("benchmark-upper-bound")
                .require_equals(true)
                .value_name("VALUE")
                .help("Upper bound of the random point coordinates")
                .value_parser(value_parser!(f64))
                .default_value("100"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .require_equals(true)
                .value_name("SEED")
                .help("Seed for generating the random points")
                .value_parser(value_parser!(u64)),
        );
    add_verbosity_arguments(add_overwrite_arguments(command))
}

/// Runs the actions for the `deform` subcommand using the given arguments.
pub fn run_deform_subcommand(arguments: &ArgMatches) {
    let config = deformation_config_from_arguments(arguments);
    let verbosity = parse_verbosity(arguments, true);

    let summary = exit_on_error!(
        run_deformation(&config, &verbosity),
        "Error: Could not deform tractogram: {}"
    );

    if verbosity.print_messages() {
        println!(
            "Deformed {} points in {} polylines",
            summary.n_points, summary.n_polylines
        );
    }
}

fn deformation_config_from_arguments(arguments: &ArgMatches) -> DeformationConfig {
    let field_path: PathBuf = arguments
        .get_one::<PathBuf>("field-file")
        .expect("No value for required argument")
        .clone();
    let tractogram_path: PathBuf = arguments
        .get_one::<PathBuf>("tractogram-file")
        .expect("No value for required argument")
        .clone();

    let mut config = DeformationConfig::new(field_path, tractogram_path);

    config.output_tractogram_path = get_value_from_parseable_argument(arguments, "output-file");

    config.voxel_extents =
        parse_3d_float_values(arguments, "voxel-extents", AllowInfinity::No, AllowZero::No)
            .map(|extents| Vec3::new(extents[X], extents[Y], extents[Z]));
    if let Some(extents) = &config.voxel_extents {
        exit_on_false!(
            extents[X] > 0.0 && extents[Y] > 0.0 && extents[Z] > 0.0,
            "Error: voxel-extents must be positive"
        );
    }

    if let Some(point) =
        parse_3d_float_values(arguments, "test-point", AllowInfinity::No, AllowZero::Yes)
    {
        config.test_point = Point3::new(point[X], point[Y], point[Z]);
    }

    if let Some(n_points) = get_value_from_parseable_argument(arguments, "benchmark-points") {
        config.n_benchmark_points = n_points;
    }
    if let Some(upper_bound) =
        get_finite_float_value_from_parseable_argument(arguments, "benchmark-upper-bound")
    {
        exit_on_false!(
            upper_bound > 0.0,
            "Error: benchmark-upper-bound must be positive"
        );
        config.benchmark_upper_bound = upper_bound;
    }
    config.seed = get_value_from_parseable_argument(arguments, "seed");
    config.overwrite_mode = overwrite_mode_from_arguments(arguments);

    config
}
