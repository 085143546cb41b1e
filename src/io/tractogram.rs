//! Reading and writing of tractogram files.

use super::{
    utils::{read_text_file, AtomicOutputPath},
    OverwriteMode,
};
use crate::tractogram::{Polyline, Tractogram};
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fs,
    io::{self, BufWriter, Write},
    path::Path,
};

/// Floating-point precision used for tractogram coordinates.
#[allow(non_camel_case_types)]
pub type ftg = f64;

/// Defines the properties of a tractogram file format.
pub trait TractogramFormat {
    /// Type of the header accompanying the polylines.
    type Header: Clone + Send + Sync;

    /// Reads the tractogram stored at the given path.
    fn read_tractogram(&self, file_path: &Path) -> io::Result<Tractogram<ftg, Self::Header>>;

    /// Writes the given tractogram to the given path, handling any existing
    /// file according to the overwrite mode.
    fn write_tractogram(
        &self,
        file_path: &Path,
        tractogram: &Tractogram<ftg, Self::Header>,
        overwrite_mode: OverwriteMode,
    ) -> io::Result<()>;
}

/// Tractograms stored as JSON documents of the form
/// `{"header": ..., "streamlines": [[[x, y, z], ...], ...]}`.
///
/// The header may be any JSON value and is preserved as is.
///
/// Coordinates must be finite, since JSON has no representation for NaN
/// or infinity.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonTractogramFormat;

#[derive(Serialize, Deserialize)]
struct TractogramDocument {
    #[serde(default)]
    header: Value,
    streamlines: Vec<Vec<[ftg; 3]>>,
}

impl TractogramFormat for JsonTractogramFormat {
    type Header = Value;

    fn read_tractogram(&self, file_path: &Path) -> io::Result<Tractogram<ftg, Value>> {
        let document: TractogramDocument = serde_json::from_str(&read_text_file(file_path)?)
            .map_err(|err| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Could not parse tractogram {}: {}", file_path.display(), err),
                )
            })?;
        let polylines = document
            .streamlines
            .into_iter()
            .map(Polyline::from)
            .collect();
        Tractogram::new(document.header, polylines).map_err(io::Error::from)
    }

    fn write_tractogram(
        &self,
        file_path: &Path,
        tractogram: &Tractogram<ftg, Value>,
        overwrite_mode: OverwriteMode,
    ) -> io::Result<()> {
        let non_finite_point = tractogram
            .polylines()
            .iter()
            .enumerate()
            .find_map(|(polyline_idx, polyline)| {
                polyline
                    .outer_iter()
                    .find(|point| point.iter().any(|coord| !coord.is_finite()))
                    .map(|point| (polyline_idx, point.to_vec()))
            });
        if let Some((polyline_idx, point)) = non_finite_point {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Polyline {} has non-finite point {:?}, which cannot be written to {}",
                    polyline_idx,
                    point,
                    file_path.display()
                ),
            ));
        }

        let document = TractogramDocument {
            header: tractogram.header().clone(),
            streamlines: tractogram
                .polylines()
                .iter()
                .map(|polyline| {
                    polyline
                        .outer_iter()
                        .map(|point| [point[0], point[1], point[2]])
                        .collect()
                })
                .collect(),
        };

        let atomic_output_path = AtomicOutputPath::new(file_path)?;
        atomic_output_path.ensure_write_allowed(overwrite_mode)?;
        {
            let mut writer = BufWriter::new(fs::File::create(atomic_output_path.temporary_path())?);
            serde_json::to_writer(&mut writer, &document)?;
            writer.flush()?;
        }
        atomic_output_path.perform_replace()
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use serde_json::json;

    #[test]
    fn header_and_polylines_survive_writing_and_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.json");
        let header = json!({"voxel_order": "LAS", "dim": [145, 174, 145]});
        let tractogram = Tractogram::new(
            header.clone(),
            vec![
                array![[0.5, 1.0, 1.5], [2.0, 2.5, 3.0]],
                Array2::zeros((0, 3)),
            ],
        )
        .unwrap();

        let format = JsonTractogramFormat::default();
        format
            .write_tractogram(&path, &tractogram, OverwriteMode::Never)
            .unwrap();
        let read = format.read_tractogram(&path).unwrap();

        assert_eq!(read.header(), &header);
        assert_eq!(read.len(), 2);
        assert_eq!(read.polylines()[0], tractogram.polylines()[0]);
        assert_eq!(read.polylines()[1].dim(), (0, 3));
    }

    #[test]
    fn missing_header_defaults_to_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.json");
        fs::write(&path, r#"{"streamlines": [[[1, 2, 3]]]}"#).unwrap();

        let read = JsonTractogramFormat::default().read_tractogram(&path).unwrap();
        assert_eq!(read.header(), &Value::Null);
        assert_eq!(read.polylines()[0], array![[1.0, 2.0, 3.0]]);
    }

    #[test]
    fn malformed_documents_are_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.json");
        fs::write(&path, r#"{"streamlines": [[[1, 2]]]}"#).unwrap();

        let err = JsonTractogramFormat::default()
            .read_tractogram(&path)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn non_finite_coordinates_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.json");
        let tractogram = Tractogram::new(
            Value::Null,
            vec![
                array![[0.0, 1.0, 2.0]],
                array![[1.0, 1.0, 1.0], [f64::NAN, 1.0, 2.0]],
            ],
        )
        .unwrap();

        let err = JsonTractogramFormat
            .write_tractogram(&path, &tractogram, OverwriteMode::Always)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(!path.exists());

        let infinite = Tractogram::new(Value::Null, vec![array![[f64::INFINITY, 0.0, 0.0]]]).unwrap();
        assert!(JsonTractogramFormat
            .write_tractogram(&path, &infinite, OverwriteMode::Always)
            .is_err());
        assert!(!path.exists());
    }
}
