//! Multilinear interpolation of scalar fields sampled on regular grids.

use crate::{
    error::{GridError, GridResult},
    grid::{AxisLimits, CellLocation, RegularGrid},
    num::BFloat,
};
use ndarray::{prelude::*, Data};
use std::sync::Arc;

/// A scalar field sampled on the lattice points of a regular grid, evaluated
/// at arbitrary points by multilinear interpolation between the `2^N` corners
/// of the containing grid cell.
///
/// Points outside the grid are clamped to the nearest grid boundary before
/// interpolation, so the field is never extrapolated.
#[derive(Clone, Debug)]
pub struct RegularGridInterpolator<F: BFloat> {
    grid: Arc<RegularGrid<F>>,
    values: Vec<F>,
    strides: Vec<usize>,
}

impl<F: BFloat> RegularGridInterpolator<F> {
    /// Creates a new interpolator for the given field values, with lattice points
    /// spanning the given limits along each axis of the value array.
    ///
    /// # Parameters
    ///
    /// - `limits`: Lower and upper coordinate of the lattice points along each axis.
    /// - `values`: Field values at the lattice points, one array axis per grid axis.
    ///
    /// # Returns
    ///
    /// A `GridResult` which is either:
    ///
    /// - `Ok`: Contains the new interpolator.
    /// - `Err`: A `GridError::Configuration` if the number of limits differs from the
    /// number of array axes, or an axis is degenerate.
    ///
    /// # Type parameters
    ///
    /// - `S`: Storage type of the value array.
    /// - `D`: Dimensionality of the value array.
    pub fn new<S, D>(limits: &[AxisLimits<F>], values: &ArrayBase<S, D>) -> GridResult<Self>
    where
        S: Data<Elem = F>,
        D: Dimension,
    {
        let grid = RegularGrid::from_limits(limits, values.shape())?;
        Self::with_grid(Arc::new(grid), values)
    }

    /// Creates a new interpolator for the given field values on an existing grid,
    /// which may be shared with other interpolators.
    pub fn with_grid<S, D>(grid: Arc<RegularGrid<F>>, values: &ArrayBase<S, D>) -> GridResult<Self>
    where
        S: Data<Elem = F>,
        D: Dimension,
    {
        let shape = grid.shape();
        if values.shape() != shape.as_slice() {
            return Err(GridError::Configuration(format!(
                "Field array has shape {:?}, but the grid has shape {:?}",
                values.shape(),
                shape
            )));
        }

        let mut strides = vec![1; shape.len()];
        for dim in (0..shape.len().saturating_sub(1)).rev() {
            strides[dim] = strides[dim + 1] * shape[dim + 1];
        }

        Ok(Self {
            grid,
            values: values.iter().copied().collect(),
            strides,
        })
    }

    /// Returns a reference to the grid.
    pub fn grid(&self) -> &RegularGrid<F> {
        &self.grid
    }

    /// Number of axes of the underlying grid.
    pub fn n_dims(&self) -> usize {
        self.grid.n_dims()
    }

    /// Returns the field value stored at the lattice point with the given indices,
    /// or `None` if the indices are out of bounds.
    pub fn lattice_value(&self, indices: &[usize]) -> Option<F> {
        let shape = self.grid.shape();
        if indices.len() != shape.len() || indices.iter().zip(&shape).any(|(&i, &n)| i >= n) {
            return None;
        }
        Some(self.values[self.flat_index(indices)])
    }

    /// Computes the interpolated field value at the given point.
    ///
    /// Fails with `GridError::DimensionMismatch` if the number of coordinates
    /// differs from the number of grid axes.
    pub fn interp_point(&self, point: &[F]) -> GridResult<F> {
        let location = self.grid.locate(point)?;
        Ok(self.interp_located(&location))
    }

    /// Computes the interpolated field value at each of a batch of points.
    ///
    /// # Parameters
    ///
    /// - `coords`: One array of coordinates per grid axis. Element `i` of each
    /// array together make up point `i`.
    ///
    /// # Returns
    ///
    /// A `GridResult` which is either:
    ///
    /// - `Ok`: Contains an array with the interpolated value for each point.
    /// - `Err`: A `GridError::DimensionMismatch` if the number of coordinate arrays
    /// differs from the number of grid axes, or `GridError::RaggedCoordinates` if
    /// the arrays have different lengths.
    pub fn interp_points<S>(&self, coords: &[ArrayBase<S, Ix1>]) -> GridResult<Array1<F>>
    where
        S: Data<Elem = F>,
    {
        let n_points = check_batch_coords(self.n_dims(), coords)?;
        let mut location = CellLocation::for_dims(self.n_dims());
        Ok(Array1::from_shape_fn(n_points, |idx| {
            self.grid
                .locate_into(|dim| coords[dim][idx], &mut location);
            self.interp_located(&location)
        }))
    }

    /// Computes the interpolated field value at a previously located point.
    ///
    /// # Panics
    ///
    /// If the location does not belong to a grid with the same shape.
    pub fn interp_located(&self, location: &CellLocation<F>) -> F {
        let lower_indices = location.lower_indices();
        assert_eq!(
            lower_indices.len(),
            self.n_dims(),
            "Location has wrong number of dimensions"
        );
        self.blend_from_axis(0, self.flat_index(lower_indices), location.offsets())
    }

    /// Blends the corners of the cell spanned by the axes from `dim` onwards,
    /// starting at the given flat lattice index, by linear interpolation along
    /// one axis at a time.
    ///
    /// Corners on the far side of an axis with offset zero, or the near side of
    /// an axis with offset one, are never read.
    fn blend_from_axis(&self, dim: usize, index: usize, offsets: &[F]) -> F {
        if dim == offsets.len() {
            return self.values[index];
        }
        let offset = offsets[dim];
        if offset == F::zero() {
            return self.blend_from_axis(dim + 1, index, offsets);
        }
        let upper = self.blend_from_axis(dim + 1, index + self.strides[dim], offsets);
        if offset == F::one() {
            return upper;
        }
        let lower = self.blend_from_axis(dim + 1, index, offsets);
        lerp(lower, upper, offset)
    }

    fn flat_index(&self, indices: &[usize]) -> usize {
        indices
            .iter()
            .zip(&self.strides)
            .map(|(index, stride)| index * stride)
            .sum()
    }
}

/// Interpolates linearly between two values, keeping the result within
/// the closed range they span. Equal values are reproduced exactly.
fn lerp<F: BFloat>(lower: F, upper: F, offset: F) -> F {
    let value = lower + offset * (upper - lower);
    let (min, max) = if lower <= upper {
        (lower, upper)
    } else {
        (upper, lower)
    };
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Verifies that a batch query has one coordinate array per axis and that all
/// arrays have the same length, which is returned.
pub(crate) fn check_batch_coords<S>(n_dims: usize, coords: &[ArrayBase<S, Ix1>]) -> GridResult<usize>
where
    S: Data,
{
    if coords.len() != n_dims {
        return Err(GridError::DimensionMismatch {
            expected: n_dims,
            actual: coords.len(),
        });
    }
    let lengths: Vec<_> = coords.iter().map(ArrayBase::len).collect();
    let n_points = lengths.first().copied().unwrap_or(0);
    if lengths.iter().any(|&len| len != n_points) {
        return Err(GridError::RaggedCoordinates { lengths });
    }
    Ok(n_points)
}
