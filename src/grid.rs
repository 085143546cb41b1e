//! Regular grids with uniform spacing along each axis.

use crate::{
    error::{GridError, GridResult},
    num::BFloat,
};

/// Lower and upper coordinate bound of a grid axis.
pub type AxisLimits<F> = (F, F);

/// A potential crossing of the lower or upper bounds of a grid axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BoundsCrossing {
    None,
    Upper,
    Lower,
}

/// A single axis of a regular grid, with lattice points spanning
/// the closed interval between its bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct RegularAxis<F: BFloat> {
    lower_bound: F,
    upper_bound: F,
    size: usize,
    step: F,
}

impl<F: BFloat> RegularAxis<F> {
    /// Creates a new axis with `size` lattice points evenly distributed
    /// from `lower_bound` to `upper_bound`, both inclusive.
    pub fn new(lower_bound: F, upper_bound: F, size: usize) -> GridResult<Self> {
        if !(lower_bound.is_finite() && upper_bound.is_finite()) {
            return Err(GridError::Configuration(format!(
                "Axis limits ({}, {}) are not finite",
                lower_bound, upper_bound
            )));
        }
        if lower_bound >= upper_bound {
            return Err(GridError::Configuration(format!(
                "Lower axis limit {} is not smaller than upper axis limit {}",
                lower_bound, upper_bound
            )));
        }
        if size < 2 {
            return Err(GridError::Configuration(format!(
                "Axis has {} samples, at least 2 are required for interpolation",
                size
            )));
        }
        let step = (upper_bound - lower_bound) / cast_index::<F>(size - 1);
        Ok(Self {
            lower_bound,
            upper_bound,
            size,
            step,
        })
    }

    pub fn lower_bound(&self) -> F {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> F {
        self.upper_bound
    }

    pub fn limits(&self) -> AxisLimits<F> {
        (self.lower_bound, self.upper_bound)
    }

    /// Number of lattice points along the axis.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance between adjacent lattice points.
    pub fn step(&self) -> F {
        self.step
    }

    /// Returns the coordinate of the lattice point with the given index.
    pub fn coord(&self, index: usize) -> F {
        if index + 1 == self.size {
            self.upper_bound
        } else {
            self.lower_bound + cast_index::<F>(index) * self.step
        }
    }

    /// Determines whether the given coordinate lies outside the axis bounds.
    pub fn crossing(&self, coord: F) -> BoundsCrossing {
        if coord < self.lower_bound {
            BoundsCrossing::Lower
        } else if coord > self.upper_bound {
            BoundsCrossing::Upper
        } else {
            BoundsCrossing::None
        }
    }

    /// Finds the lower lattice index of the cell containing the given coordinate
    /// and the fractional offset of the coordinate within that cell.
    ///
    /// Coordinates outside the axis bounds are clamped to the nearest bound.
    /// The lower index never exceeds `size - 2`, so the upper bound maps to
    /// the last cell with an offset of one. A NaN coordinate yields a NaN offset.
    pub fn locate(&self, coord: F) -> (usize, F) {
        let last_index = cast_index::<F>(self.size - 1);
        let mut continuous_index = (coord - self.lower_bound) / self.step;

        if continuous_index < F::zero() {
            continuous_index = F::zero();
        } else if continuous_index > last_index {
            continuous_index = last_index;
        }

        let lower_index = continuous_index
            .floor()
            .to_usize()
            .unwrap_or(0)
            .min(self.size - 2);

        (
            lower_index,
            continuous_index - cast_index::<F>(lower_index),
        )
    }
}

/// Position of a query point in the lattice of a grid.
#[derive(Clone, Debug, PartialEq)]
pub struct CellLocation<F: BFloat> {
    lower_indices: Vec<usize>,
    offsets: Vec<F>,
}

impl<F: BFloat> CellLocation<F> {
    /// Creates an empty location suitable for a grid with the given number of dimensions.
    pub fn for_dims(n_dims: usize) -> Self {
        Self {
            lower_indices: vec![0; n_dims],
            offsets: vec![F::zero(); n_dims],
        }
    }

    pub fn n_dims(&self) -> usize {
        self.lower_indices.len()
    }

    /// Lower lattice indices of the containing cell along each axis.
    pub fn lower_indices(&self) -> &[usize] {
        &self.lower_indices
    }

    /// Fractional offsets within the containing cell along each axis, in `[0, 1]`.
    pub fn offsets(&self) -> &[F] {
        &self.offsets
    }
}

/// An N-dimensional axis-aligned grid with uniform spacing along each axis.
#[derive(Clone, Debug, PartialEq)]
pub struct RegularGrid<F: BFloat> {
    axes: Vec<RegularAxis<F>>,
}

impl<F: BFloat> RegularGrid<F> {
    /// Creates a new regular grid from the limits and number of lattice points
    /// along each axis.
    pub fn from_limits(limits: &[AxisLimits<F>], shape: &[usize]) -> GridResult<Self> {
        if limits.is_empty() {
            return Err(GridError::Configuration(
                "Grid must have at least one axis".to_string(),
            ));
        }
        if limits.len() != shape.len() {
            return Err(GridError::Configuration(format!(
                "Got limits for {} axes, but the field array has {} axes",
                limits.len(),
                shape.len()
            )));
        }
        let axes = limits
            .iter()
            .zip(shape)
            .map(|(&(lower_bound, upper_bound), &size)| {
                RegularAxis::new(lower_bound, upper_bound, size)
            })
            .collect::<GridResult<Vec<_>>>()?;
        Ok(Self { axes })
    }

    /// Number of axes of the grid.
    pub fn n_dims(&self) -> usize {
        self.axes.len()
    }

    pub fn axes(&self) -> &[RegularAxis<F>] {
        &self.axes
    }

    pub fn axis(&self, dim: usize) -> &RegularAxis<F> {
        &self.axes[dim]
    }

    /// Returns the number of lattice points along each axis.
    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(RegularAxis::size).collect()
    }

    /// Returns the limits of each axis.
    pub fn limits(&self) -> Vec<AxisLimits<F>> {
        self.axes.iter().map(RegularAxis::limits).collect()
    }

    /// Returns the total number of lattice points.
    pub fn n_lattice_points(&self) -> usize {
        self.axes.iter().map(RegularAxis::size).product()
    }

    /// Returns the coordinates of the lattice point with the given indices.
    ///
    /// # Panics
    ///
    /// If the number of indices does not match the number of axes.
    pub fn lattice_point(&self, indices: &[usize]) -> Vec<F> {
        assert_eq!(
            indices.len(),
            self.n_dims(),
            "Number of indices does not match number of axes"
        );
        self.axes
            .iter()
            .zip(indices)
            .map(|(axis, &index)| axis.coord(index))
            .collect()
    }

    /// Whether the given point lies within the closed bounds of every axis.
    pub fn contains(&self, point: &[F]) -> bool {
        point.len() == self.n_dims()
            && self
                .axes
                .iter()
                .zip(point)
                .all(|(axis, &coord)| axis.crossing(coord) == BoundsCrossing::None)
    }

    /// Determines for each axis whether the given point crosses its bounds.
    pub fn crossings(&self, point: &[F]) -> GridResult<Vec<BoundsCrossing>> {
        self.check_point_dims(point.len())?;
        Ok(self
            .axes
            .iter()
            .zip(point)
            .map(|(axis, &coord)| axis.crossing(coord))
            .collect())
    }

    /// Locates the given point in the lattice, clamping it to the grid bounds.
    pub fn locate(&self, point: &[F]) -> GridResult<CellLocation<F>> {
        self.check_point_dims(point.len())?;
        let mut location = CellLocation::for_dims(self.n_dims());
        self.locate_into(|dim| point[dim], &mut location);
        Ok(location)
    }

    /// Locates the point whose coordinate along each axis is given by the
    /// provided closure, writing the result into an existing location.
    pub(crate) fn locate_into<C>(&self, coord: C, location: &mut CellLocation<F>)
    where
        C: Fn(usize) -> F,
    {
        debug_assert_eq!(location.n_dims(), self.n_dims());
        for (dim, axis) in self.axes.iter().enumerate() {
            let (lower_index, offset) = axis.locate(coord(dim));
            location.lower_indices[dim] = lower_index;
            location.offsets[dim] = offset;
        }
    }

    fn check_point_dims(&self, n_coords: usize) -> GridResult<()> {
        if n_coords == self.n_dims() {
            Ok(())
        } else {
            Err(GridError::DimensionMismatch {
                expected: self.n_dims(),
                actual: n_coords,
            })
        }
    }
}

fn cast_index<F: BFloat>(index: usize) -> F {
    F::from_usize(index).unwrap_or_else(F::infinity)
}
