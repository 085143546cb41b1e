//! Deformation of a tractogram file with a displacement field file.

use crate::{
    deformation::DisplacementField3,
    geometry::{Point3, Vec3},
    io::{
        field::{fdf, DisplacementFieldReader, NpyDisplacementFieldReader},
        tractogram::{JsonTractogramFormat, TractogramFormat},
        OverwriteMode, Verbosity,
    },
};
use ndarray::prelude::*;
use rand::{distributions::Uniform, rngs::StdRng, Rng, SeedableRng};
use std::{
    hint, io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

/// Parameters for deforming a tractogram.
#[derive(Clone, Debug)]
pub struct DeformationConfig {
    /// Path to the displacement field file.
    pub field_path: PathBuf,
    /// Physical extent of a field voxel along each axis. Overrides any
    /// extents provided by the field reader.
    pub voxel_extents: Option<Vec3<fdf>>,
    /// Path to the tractogram to deform.
    pub input_tractogram_path: PathBuf,
    /// Path where the deformed tractogram should be written. Derived from
    /// the input path if not specified.
    pub output_tractogram_path: Option<PathBuf>,
    /// Point whose displacement is reported before deforming the tractogram.
    pub test_point: Point3<fdf>,
    /// Number of random points to deform for estimating performance.
    pub n_benchmark_points: usize,
    /// Upper bound of the random benchmark point coordinates.
    pub benchmark_upper_bound: fdf,
    /// Seed for generating the benchmark points.
    pub seed: Option<u64>,
    /// How to handle an existing output file.
    pub overwrite_mode: OverwriteMode,
}

impl DeformationConfig {
    pub const DEFAULT_VOXEL_EXTENT: fdf = 1.0;
    pub const DEFAULT_TEST_COORD: fdf = 120.0;
    pub const DEFAULT_N_BENCHMARK_POINTS: usize = 1000;
    pub const DEFAULT_BENCHMARK_UPPER_BOUND: fdf = 100.0;
    pub const OUTPUT_STEM_SUFFIX: &'static str = "_deformed";

    /// Creates a new configuration with default parameters for deforming the
    /// given tractogram with the given field.
    pub fn new<P1, P2>(field_path: P1, input_tractogram_path: P2) -> Self
    where
        P1: AsRef<Path>,
        P2: AsRef<Path>,
    {
        Self {
            field_path: field_path.as_ref().to_path_buf(),
            voxel_extents: None,
            input_tractogram_path: input_tractogram_path.as_ref().to_path_buf(),
            output_tractogram_path: None,
            test_point: Point3::new(
                Self::DEFAULT_TEST_COORD,
                Self::DEFAULT_TEST_COORD,
                Self::DEFAULT_TEST_COORD,
            ),
            n_benchmark_points: Self::DEFAULT_N_BENCHMARK_POINTS,
            benchmark_upper_bound: Self::DEFAULT_BENCHMARK_UPPER_BOUND,
            seed: None,
            overwrite_mode: OverwriteMode::Ask,
        }
    }

    /// Returns the path where the deformed tractogram will be written.
    pub fn output_path(&self) -> PathBuf {
        self.output_tractogram_path
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input_tractogram_path))
    }
}

/// Outcome of deforming a tractogram.
#[derive(Clone, Debug)]
pub struct DeformationSummary {
    /// Displacement of the configured test point.
    pub test_displacement: Vec3<fdf>,
    /// Time spent deforming the random benchmark points.
    pub benchmark_duration: Duration,
    /// Time spent deforming the tractogram.
    pub deformation_duration: Duration,
    pub n_polylines: usize,
    pub n_points: usize,
    /// Number of tractogram points outside the field grid, whose displacement
    /// was taken from the nearest grid boundary.
    pub n_clamped_points: usize,
    pub output_path: PathBuf,
}

/// Returns the default output path for the deformed version of the given
/// tractogram, which has `_deformed` appended to the file stem.
pub fn default_output_path(input_path: &Path) -> PathBuf {
    let mut file_name = input_path
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_default();
    file_name.push(DeformationConfig::OUTPUT_STEM_SUFFIX);
    if let Some(extension) = input_path.extension() {
        file_name.push(".");
        file_name.push(extension);
    }
    input_path.with_file_name(file_name)
}

/// Deforms the `.npy` field and JSON tractogram specified in the configuration.
pub fn run_deformation(
    config: &DeformationConfig,
    verbosity: &Verbosity,
) -> io::Result<DeformationSummary> {
    run_deformation_with(
        config,
        &NpyDisplacementFieldReader,
        &JsonTractogramFormat::default(),
        verbosity,
    )
}

/// Deforms the tractogram specified in the configuration, using the given
/// field reader and tractogram format.
///
/// # Parameters
///
/// - `config`: Paths and parameters for the deformation.
/// - `field_reader`: Reader for the displacement field file.
/// - `format`: Format of the input and output tractogram files.
/// - `verbosity`: Whether and how to report status.
///
/// # Returns
///
/// An `io::Result` which is either:
///
/// - `Ok`: Contains a summary of the performed deformation.
/// - `Err`: The first error encountered. Nothing is written in that case.
///
/// # Type parameters
///
/// - `R`: Type of field reader.
/// - `T`: Type of tractogram format.
pub fn run_deformation_with<R, T>(
    config: &DeformationConfig,
    field_reader: &R,
    format: &T,
    verbosity: &Verbosity,
) -> io::Result<DeformationSummary>
where
    R: DisplacementFieldReader,
    T: TractogramFormat,
{
    let print_messages = verbosity.print_messages();

    if print_messages {
        println!(
            "Loading deformation field: {}",
            config.field_path.display()
        );
    }
    let volume = field_reader.read_displacement_volume(&config.field_path)?;
    let voxel_extents = config
        .voxel_extents
        .clone()
        .or(volume.voxel_extents)
        .unwrap_or_else(|| Vec3::equal_components(DeformationConfig::DEFAULT_VOXEL_EXTENT));

    let field = DisplacementField3::from_array(&volume.data, &voxel_extents)?;
    if print_messages {
        println!(
            "The volume has the following limits: {}",
            field
                .limits()
                .map(|(lower, upper)| format!("({}, {})", lower, upper))
        );
        println!("Computing the deformation of one point");
    }

    let test_displacement = field.displacement_at(&config.test_point);
    if print_messages {
        println!("Test point: {}", config.test_point);
        println!("Deformation: {}", test_displacement);
    }

    if print_messages {
        println!(
            "Estimating time for deforming {} points",
            config.n_benchmark_points
        );
    }
    let benchmark_duration = benchmark_random_points(
        &field,
        config.n_benchmark_points,
        config.benchmark_upper_bound,
        config.seed,
    )?;
    if print_messages {
        println!("{:.6} s", benchmark_duration.as_secs_f64());
    }

    if print_messages {
        println!(
            "Loading tractogram: {}",
            config.input_tractogram_path.display()
        );
    }
    let tractogram = format.read_tractogram(&config.input_tractogram_path)?;

    let n_clamped_points = tractogram.count_points_outside(field.grid());
    if n_clamped_points > 0 && print_messages {
        eprintln!(
            "Warning: {} of {} points lie outside the deformation field and use its boundary values",
            n_clamped_points,
            tractogram.point_count()
        );
    }

    if print_messages {
        println!("Deforming tractogram");
    }
    let start_instant = Instant::now();
    let deformed = tractogram.deformed(&field, verbosity)?;
    let deformation_duration = start_instant.elapsed();
    if print_messages {
        println!("{:.6} s", deformation_duration.as_secs_f64());
    }

    let output_path = config.output_path();
    if print_messages {
        println!(
            "Saving deformed tractogram: {}",
            output_path.display()
        );
    }
    format.write_tractogram(&output_path, &deformed, config.overwrite_mode)?;

    Ok(DeformationSummary {
        test_displacement,
        benchmark_duration,
        deformation_duration,
        n_polylines: deformed.len(),
        n_points: deformed.point_count(),
        n_clamped_points,
        output_path,
    })
}

/// Measures the time taken to compute displacements for the given number of
/// points drawn uniformly from `[0, upper_bound)` along each axis.
pub fn benchmark_random_points(
    field: &DisplacementField3<fdf>,
    n_points: usize,
    upper_bound: fdf,
    seed: Option<u64>,
) -> io::Result<Duration> {
    if !(upper_bound.is_finite() && upper_bound > 0.0) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Upper bound for benchmark points must be positive and finite, got {}",
                upper_bound
            ),
        ));
    }
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let distribution = Uniform::new(0.0, upper_bound);
    let points = Array2::from_shape_simple_fn((n_points, 3), || rng.sample(&distribution));

    let start_instant = Instant::now();
    let displacements =
        field.displacements(&points.column(0), &points.column(1), &points.column(2))?;
    let duration = start_instant.elapsed();
    hint::black_box(displacements);
    Ok(duration)
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn default_output_path_appends_suffix_to_stem() {
        assert_eq!(
            default_output_path(Path::new("data/tracks_dti_1M.json")),
            PathBuf::from("data/tracks_dti_1M_deformed.json")
        );
        assert_eq!(
            default_output_path(Path::new("tracks")),
            PathBuf::from("tracks_deformed")
        );
    }

    #[test]
    fn explicit_output_path_takes_precedence() {
        let mut config = DeformationConfig::new("field.npy", "tracks.json");
        assert_eq!(config.output_path(), PathBuf::from("tracks_deformed.json"));
        config.output_tractogram_path = Some(PathBuf::from("out/warped.json"));
        assert_eq!(config.output_path(), PathBuf::from("out/warped.json"));
    }

    #[test]
    fn benchmark_rejects_invalid_upper_bound() {
        let array = Array4::<fdf>::zeros((2, 2, 2, 3));
        let field = DisplacementField3::from_array(&array, &Vec3::equal_components(1.0)).unwrap();
        assert_eq!(
            benchmark_random_points(&field, 10, 0.0, Some(0))
                .unwrap_err()
                .kind(),
            io::ErrorKind::InvalidInput
        );
        assert!(benchmark_random_points(&field, 10, 100.0, Some(0)).is_ok());
    }
}
