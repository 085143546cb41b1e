//! Reading of displacement field volumes.

use super::utils::read_text_file;
use crate::geometry::Vec3;
use ndarray::prelude::*;
use ndarray_npy::{read_npy, ReadNpyError};
use serde::Deserialize;
use std::{
    io,
    path::{Path, PathBuf},
};

/// Floating-point precision used for displacement field data.
#[allow(non_camel_case_types)]
pub type fdf = f64;

/// A displacement volume as provided by a field reader.
#[derive(Clone, Debug)]
pub struct DisplacementVolume {
    /// Array of shape `[nx, ny, nz, 3]` holding the displacement at each voxel.
    pub data: Array4<fdf>,
    /// Physical extent of a voxel along each axis, if known by the reader.
    pub voxel_extents: Option<Vec3<fdf>>,
}

/// Defines the properties of a reader of displacement field volumes.
pub trait DisplacementFieldReader {
    /// Reads the displacement volume stored at the given path.
    fn read_displacement_volume(&self, file_path: &Path) -> io::Result<DisplacementVolume>;
}

/// Reads displacement volumes from 4D `.npy` arrays of 32- or 64-bit floats.
///
/// Voxel extents are taken from an optional JSON sidecar file with the same
/// path but a `.json` extension, containing `{"voxel_extents": [dx, dy, dz]}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NpyDisplacementFieldReader;

#[derive(Deserialize)]
struct VolumeSidecar {
    voxel_extents: [fdf; 3],
}

impl NpyDisplacementFieldReader {
    /// Returns the path of the sidecar file belonging to the given field file.
    pub fn sidecar_path(file_path: &Path) -> PathBuf {
        file_path.with_extension("json")
    }

    fn read_data(file_path: &Path) -> io::Result<Array4<fdf>> {
        match read_npy::<_, Array4<fdf>>(file_path) {
            Ok(data) => Ok(data),
            Err(ReadNpyError::WrongDescriptor(_)) => read_npy::<_, Array4<f32>>(file_path)
                .map(|data| data.mapv(fdf::from))
                .map_err(npy_error_to_io_error),
            Err(err) => Err(npy_error_to_io_error(err)),
        }
    }

    fn read_voxel_extents(file_path: &Path) -> io::Result<Option<Vec3<fdf>>> {
        let sidecar_path = Self::sidecar_path(file_path);
        if !sidecar_path.exists() {
            return Ok(None);
        }
        let sidecar: VolumeSidecar = serde_json::from_str(&read_text_file(&sidecar_path)?)
            .map_err(|err| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "Invalid voxel extents in {}: {}",
                        sidecar_path.display(),
                        err
                    ),
                )
            })?;
        let [dx, dy, dz] = sidecar.voxel_extents;
        Ok(Some(Vec3::new(dx, dy, dz)))
    }
}

impl DisplacementFieldReader for NpyDisplacementFieldReader {
    fn read_displacement_volume(&self, file_path: &Path) -> io::Result<DisplacementVolume> {
        Ok(DisplacementVolume {
            data: Self::read_data(file_path)?,
            voxel_extents: Self::read_voxel_extents(file_path)?,
        })
    }
}

fn npy_error_to_io_error(err: ReadNpyError) -> io::Error {
    match err {
        ReadNpyError::Io(err) => err,
        err => io::Error::new(io::ErrorKind::InvalidData, err),
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use ndarray_npy::write_npy;
    use std::fs;

    #[test]
    fn single_precision_arrays_are_widened() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.npy");
        let data = Array4::<f32>::from_shape_fn((2, 3, 4, 3), |(i, j, k, c)| {
            (i + 10 * j + 100 * k) as f32 + 0.5 * c as f32
        });
        write_npy(&path, &data).unwrap();

        let volume = NpyDisplacementFieldReader
            .read_displacement_volume(&path)
            .unwrap();
        assert_eq!(volume.data.dim(), (2, 3, 4, 3));
        assert_eq!(volume.data[[1, 2, 3, 2]], 321.0 + 1.0);
        assert!(volume.voxel_extents.is_none());
    }

    #[test]
    fn sidecar_voxel_extents_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.npy");
        write_npy(&path, &Array4::<f64>::zeros((2, 2, 2, 3))).unwrap();
        fs::write(
            NpyDisplacementFieldReader::sidecar_path(&path),
            r#"{"voxel_extents": [0.5, 0.75, 1.25]}"#,
        )
        .unwrap();

        let volume = NpyDisplacementFieldReader
            .read_displacement_volume(&path)
            .unwrap();
        assert_eq!(volume.voxel_extents, Some(Vec3::new(0.5, 0.75, 1.25)));
    }

    #[test]
    fn missing_field_file_gives_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = NpyDisplacementFieldReader
            .read_displacement_volume(&dir.path().join("missing.npy"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn arrays_of_wrong_rank_are_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.npy");
        write_npy(&path, &Array3::<f64>::zeros((2, 2, 3))).unwrap();
        let err = NpyDisplacementFieldReader
            .read_displacement_volume(&path)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
