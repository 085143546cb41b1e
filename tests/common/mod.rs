#![allow(dead_code)]

use ndarray::prelude::*;
use ndarray_npy::write_npy;
use serde_json::{json, Value};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

#[cfg(feature = "cli")]
use std::ffi::OsString;
#[cfg(feature = "cli")]
use tractwarp::cli;

#[cfg(feature = "cli")]
pub fn run<I, T>(args: I)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    cli::run::run_with_args(cli::build::build().get_matches_from(args));
}

#[macro_export]
macro_rules! path_str {
    ($path:expr) => {
        $path.to_string_lossy().as_ref()
    };
}

pub fn assert_file_exists<P: AsRef<Path>>(file_path: P) {
    let file_path = file_path.as_ref();
    assert!(
        file_path.exists(),
        "File {} does not exist",
        file_path.to_string_lossy()
    );
}

/// Scratch directory holding the input and output files of a single test.
#[derive(Debug)]
pub struct Test {
    dir: TempDir,
}

impl Test {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Could not create temporary directory"),
        }
    }

    pub fn path<S: AsRef<str>>(&self, file_name: S) -> PathBuf {
        self.dir.path().join(file_name.as_ref())
    }

    /// Writes a `[nx, ny, nz, 3]` displacement field to a `.npy` file.
    pub fn write_field<S: AsRef<str>>(&self, file_name: S, field: &Array4<f64>) -> PathBuf {
        let path = self.path(file_name);
        write_npy(&path, field).expect("Could not write field");
        path
    }

    /// Writes voxel extents to the JSON sidecar of the given field file.
    pub fn write_field_sidecar(&self, field_path: &Path, voxel_extents: [f64; 3]) {
        fs::write(
            field_path.with_extension("json"),
            json!({ "voxel_extents": voxel_extents }).to_string(),
        )
        .expect("Could not write sidecar");
    }

    pub fn write_tractogram<S: AsRef<str>>(
        &self,
        file_name: S,
        header: Value,
        streamlines: &[Vec<[f64; 3]>],
    ) -> PathBuf {
        let path = self.path(file_name);
        fs::write(
            &path,
            json!({ "header": header, "streamlines": streamlines }).to_string(),
        )
        .expect("Could not write tractogram");
        path
    }
}

/// Reads the header and streamlines of a JSON tractogram file.
pub fn read_tractogram<P: AsRef<Path>>(path: P) -> (Value, Vec<Vec<[f64; 3]>>) {
    let text = fs::read_to_string(path).expect("Could not read tractogram");
    let mut document: Value = serde_json::from_str(&text).expect("Invalid tractogram JSON");
    let header = document["header"].take();
    let streamlines = serde_json::from_value(document["streamlines"].take())
        .expect("Invalid tractogram streamlines");
    (header, streamlines)
}

/// Field with the uniform displacement `shift` on a grid of `n` voxels of
/// extent `voxel_extent` along each axis.
pub fn uniform_field(n: usize, shift: [f64; 3]) -> Array4<f64> {
    Array4::from_shape_fn((n, n, n, 3), |(_, _, _, c)| shift[c])
}

/// Field whose x-component varies linearly as `slope * x` along the lattice.
pub fn linear_x_field(n: usize, voxel_extent: f64, slope: f64) -> Array4<f64> {
    let step = voxel_extent * n as f64 / (n - 1) as f64;
    Array4::from_shape_fn((n, n, n, 3), |(i, _, _, c)| {
        if c == 0 {
            slope * i as f64 * step
        } else {
            0.0
        }
    })
}
