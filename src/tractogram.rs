//! Sets of polylines and their deformation.

use crate::{
    deformation::{DisplacementField3, N_COMPONENTS},
    error::{GridError, GridResult},
    grid::RegularGrid,
    io::Verbosity,
    num::BFloat,
};
use atomic_counter::{AtomicCounter, RelaxedCounter};
use indicatif::ParallelProgressIterator;
use ndarray::prelude::*;
use rayon::prelude::*;

/// Number of processed polylines between each status message.
pub const STATUS_MESSAGE_INTERVAL: usize = 1000;

/// An ordered sequence of 3D points, stored as the rows of an `[n_points, 3]` array.
pub type Polyline<F> = Array2<F>;

/// A set of polylines together with a header describing them.
///
/// The header is never inspected and is carried along unchanged
/// when the tractogram is deformed.
#[derive(Clone, Debug, PartialEq)]
pub struct Tractogram<F: BFloat, H> {
    header: H,
    polylines: Vec<Polyline<F>>,
}

impl<F: BFloat, H> Tractogram<F, H> {
    /// Creates a new tractogram from the given header and polylines.
    ///
    /// Fails with `GridError::DimensionMismatch` if any polyline does not
    /// have three coordinates per point.
    pub fn new(header: H, polylines: Vec<Polyline<F>>) -> GridResult<Self> {
        if let Some(polyline) = polylines
            .iter()
            .find(|polyline| polyline.ncols() != N_COMPONENTS)
        {
            return Err(GridError::DimensionMismatch {
                expected: N_COMPONENTS,
                actual: polyline.ncols(),
            });
        }
        Ok(Self { header, polylines })
    }

    pub fn header(&self) -> &H {
        &self.header
    }

    pub fn polylines(&self) -> &[Polyline<F>] {
        &self.polylines
    }

    /// Number of polylines.
    pub fn len(&self) -> usize {
        self.polylines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty()
    }

    /// Total number of points over all polylines.
    pub fn point_count(&self) -> usize {
        self.polylines.iter().map(Array2::nrows).sum()
    }

    /// Counts the points lying outside the bounds of the given grid.
    pub fn count_points_outside(&self, grid: &RegularGrid<F>) -> usize {
        self.polylines
            .par_iter()
            .map(|polyline| {
                polyline
                    .outer_iter()
                    .filter(|point| match point.as_slice() {
                        Some(coords) => !grid.contains(coords),
                        None => !grid.contains(&point.to_vec()),
                    })
                    .count()
            })
            .sum()
    }

    /// Consumes the tractogram and returns its header and polylines.
    pub fn into_parts(self) -> (H, Vec<Polyline<F>>) {
        (self.header, self.polylines)
    }
}

impl<F, H> Tractogram<F, H>
where
    F: BFloat,
    H: Clone,
{
    /// Computes a new tractogram where every point of every polyline has been
    /// moved by the given displacement field.
    ///
    /// # Parameters
    ///
    /// - `field`: Displacement field to apply.
    /// - `verbosity`: Whether and how to report progress.
    ///
    /// # Returns
    ///
    /// A `GridResult` which is either:
    ///
    /// - `Ok`: Contains the deformed tractogram, with the same header and the same
    /// number of polylines and points per polyline as the original.
    /// - `Err`: The error encountered for the first failing polyline.
    pub fn deformed(
        &self,
        field: &DisplacementField3<F>,
        verbosity: &Verbosity,
    ) -> GridResult<Self> {
        let n_polylines = self.len();
        let processed_count = RelaxedCounter::new(0);
        let print_messages = verbosity.print_messages() && !verbosity.show_progress();

        let polylines = self
            .polylines
            .par_iter()
            .progress_with(verbosity.create_progress_bar(n_polylines))
            .map(|polyline| {
                let deformed = field.deform_points(polyline);
                let count = processed_count.inc() + 1;
                if print_messages && count % STATUS_MESSAGE_INTERVAL == 0 {
                    println!("Deformed {} of {} polylines", count, n_polylines);
                }
                deformed
            })
            .collect::<GridResult<Vec<_>>>()?;

        Ok(Self {
            header: self.header.clone(),
            polylines,
        })
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::geometry::Vec3;
    use approx::assert_abs_diff_eq;

    fn uniform_shift_field(shift: [f64; 3]) -> DisplacementField3<f64> {
        let array = Array4::from_shape_fn((4, 4, 4, 3), |(_, _, _, c)| shift[c]);
        DisplacementField3::from_array(&array, &Vec3::equal_components(25.0)).unwrap()
    }

    fn example_tractogram() -> Tractogram<f64, String> {
        Tractogram::new(
            "header".to_string(),
            vec![
                array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]],
                Array2::zeros((0, 3)),
                array![[50.0, 50.0, 50.0]],
            ],
        )
        .unwrap()
    }

    #[test]
    fn deformation_preserves_shape_and_header() {
        let tractogram = example_tractogram();
        let deformed = tractogram
            .deformed(&uniform_shift_field([1.0, -1.0, 0.5]), &Verbosity::Quiet)
            .unwrap();

        assert_eq!(deformed.header(), tractogram.header());
        assert_eq!(deformed.len(), tractogram.len());
        for (original, moved) in tractogram.polylines().iter().zip(deformed.polylines()) {
            assert_eq!(original.dim(), moved.dim());
        }
        assert_eq!(deformed.point_count(), 4);
    }

    #[test]
    fn deformation_shifts_every_point() {
        let tractogram = example_tractogram();
        let deformed = tractogram
            .deformed(&uniform_shift_field([1.0, -1.0, 0.5]), &Verbosity::Quiet)
            .unwrap();

        let shift = array![1.0, -1.0, 0.5];
        for (original, moved) in tractogram.polylines().iter().zip(deformed.polylines()) {
            for (point, moved_point) in original.outer_iter().zip(moved.outer_iter()) {
                for dim in 0..3 {
                    assert_abs_diff_eq!(moved_point[dim], point[dim] + shift[dim]);
                }
            }
        }
    }

    #[test]
    fn polylines_without_three_coordinates_are_rejected() {
        assert_eq!(
            Tractogram::new((), vec![Array2::<f64>::zeros((5, 2))]),
            Err(GridError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn points_outside_field_are_counted() {
        let tractogram = Tractogram::new(
            (),
            vec![
                array![[1.0, 1.0, 1.0], [101.0, 1.0, 1.0]],
                array![[-0.5, 2.0, 2.0]],
            ],
        )
        .unwrap();
        let field = uniform_shift_field([0.0; 3]);
        assert_eq!(tractogram.count_points_outside(field.grid()), 2);
    }
}
