//! Displacement fields and their application to points in space.

use crate::{
    error::{GridError, GridResult},
    geometry::{
        Dim3::{self, X, Y, Z},
        In3D, Point3, Vec3,
    },
    grid::{AxisLimits, CellLocation, RegularGrid},
    interpolation::{check_batch_coords, RegularGridInterpolator},
    num::BFloat,
};
use ndarray::{prelude::*, Data};
use std::sync::Arc;

/// Number of components of a displacement vector.
pub const N_COMPONENTS: usize = 3;

/// A 3D displacement field sampled on a regular grid, with one
/// interpolator for each displacement component.
///
/// The three component interpolators share the same grid, so each
/// query point is located in the grid only once.
#[derive(Clone, Debug)]
pub struct DisplacementField3<F: BFloat> {
    components: In3D<RegularGridInterpolator<F>>,
}

impl<F: BFloat> DisplacementField3<F> {
    /// Creates a new displacement field from separate arrays for the x-, y- and
    /// z-components, with lattice points spanning the given limits along each axis.
    pub fn from_components<S>(
        limits: &In3D<AxisLimits<F>>,
        components: &In3D<ArrayBase<S, Ix3>>,
    ) -> GridResult<Self>
    where
        S: Data<Elem = F>,
    {
        let grid = Arc::new(RegularGrid::from_limits(
            limits.as_array(),
            components[X].shape(),
        )?);
        let interpolators = [
            RegularGridInterpolator::with_grid(Arc::clone(&grid), &components[X])?,
            RegularGridInterpolator::with_grid(Arc::clone(&grid), &components[Y])?,
            RegularGridInterpolator::with_grid(grid, &components[Z])?,
        ];
        let [x, y, z] = interpolators;
        Ok(Self {
            components: In3D::new(x, y, z),
        })
    }

    /// Creates a new displacement field from a 4D array where the first three
    /// axes are spatial and the last holds the x-, y- and z-components.
    ///
    /// # Parameters
    ///
    /// - `array`: Array with shape `[nx, ny, nz, 3]`.
    /// - `voxel_extents`: Physical extent of a voxel along each spatial axis.
    ///
    /// # Returns
    ///
    /// A `GridResult` which is either:
    ///
    /// - `Ok`: Contains the new displacement field, whose grid extends from the
    /// origin to `voxel_extent * voxel_count` along each axis.
    /// - `Err`: A `GridError::Configuration` if the last axis does not have
    /// three components or the grid is degenerate.
    pub fn from_array<S>(array: &ArrayBase<S, Ix4>, voxel_extents: &Vec3<F>) -> GridResult<Self>
    where
        S: Data<Elem = F>,
    {
        let shape = array.shape();
        if shape[3] != N_COMPONENTS {
            return Err(GridError::Configuration(format!(
                "Displacement array must have {} components along its last axis, got {}",
                N_COMPONENTS, shape[3]
            )));
        }
        let limits = In3D::with_each_component(|dim| {
            let voxel_count = F::from_usize(shape[dim.num()]).unwrap_or_else(F::nan);
            (F::zero(), voxel_extents[dim] * voxel_count)
        });
        let components = In3D::with_each_component(|dim| array.index_axis(Axis(3), dim.num()));
        Self::from_components(&limits, &components)
    }

    /// Returns a reference to the grid shared by the components.
    pub fn grid(&self) -> &RegularGrid<F> {
        self.components[X].grid()
    }

    /// Returns the limits of the grid along each spatial axis.
    pub fn limits(&self) -> In3D<AxisLimits<F>> {
        let grid = self.grid();
        In3D::with_each_component(|dim| grid.axis(dim.num()).limits())
    }

    /// Returns a reference to the interpolator for the given displacement component.
    pub fn component(&self, dim: Dim3) -> &RegularGridInterpolator<F> {
        &self.components[dim]
    }

    /// Computes the interpolated displacement at the given point.
    pub fn displacement_at(&self, point: &Point3<F>) -> Vec3<F> {
        let mut location = CellLocation::for_dims(N_COMPONENTS);
        self.grid()
            .locate_into(|dim| point[Dim3::slice()[dim]], &mut location);
        self.displacement_at_location(&location)
    }

    /// Computes the position the given point is moved to by the displacement field.
    pub fn displaced_point(&self, point: &Point3<F>) -> Point3<F> {
        point + &self.displacement_at(point)
    }

    /// Computes the interpolated displacement for each of a batch of points.
    ///
    /// # Parameters
    ///
    /// - `xs`, `ys`, `zs`: Coordinates of the points along each axis.
    ///
    /// # Returns
    ///
    /// A `GridResult` which is either:
    ///
    /// - `Ok`: Contains an array of shape `[n_points, 3]` with the displacements.
    /// - `Err`: A `GridError::RaggedCoordinates` if the coordinate arrays have
    /// different lengths.
    pub fn displacements<S>(
        &self,
        xs: &ArrayBase<S, Ix1>,
        ys: &ArrayBase<S, Ix1>,
        zs: &ArrayBase<S, Ix1>,
    ) -> GridResult<Array2<F>>
    where
        S: Data<Elem = F>,
    {
        let coords = [xs.view(), ys.view(), zs.view()];
        let n_points = check_batch_coords(N_COMPONENTS, &coords)?;

        let mut displacements = Array2::zeros((n_points, N_COMPONENTS));
        let mut location = CellLocation::for_dims(N_COMPONENTS);
        for (idx, mut displacement) in displacements.outer_iter_mut().enumerate() {
            self.grid()
                .locate_into(|dim| coords[dim][idx], &mut location);
            for dim in Dim3::slice() {
                displacement[dim.num()] = self.components[dim].interp_located(&location);
            }
        }
        Ok(displacements)
    }

    /// Computes the displaced positions of a batch of points given as the rows
    /// of an array of shape `[n_points, 3]`.
    ///
    /// Fails with `GridError::DimensionMismatch` if the array does not have
    /// three columns.
    pub fn deform_points<S>(&self, points: &ArrayBase<S, Ix2>) -> GridResult<Array2<F>>
    where
        S: Data<Elem = F>,
    {
        if points.ncols() != N_COMPONENTS {
            return Err(GridError::DimensionMismatch {
                expected: N_COMPONENTS,
                actual: points.ncols(),
            });
        }
        let displacements = self.displacements(
            &points.column(0),
            &points.column(1),
            &points.column(2),
        )?;
        Ok(displacements + points)
    }

    fn displacement_at_location(&self, location: &CellLocation<F>) -> Vec3<F> {
        Vec3::with_each_component(|dim| self.components[dim].interp_located(location))
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_abs_diff_eq;

    fn linear_field() -> DisplacementField3<f64> {
        // Displacement (0.1 x, -0.2 y, 1) sampled at 2 mm voxels
        let array = Array4::from_shape_fn((11, 9, 7, 3), |(i, j, _, c)| match c {
            0 => 0.1 * (i as f64 * 22.0 / 10.0),
            1 => -0.2 * (j as f64 * 18.0 / 8.0),
            _ => 1.0,
        });
        DisplacementField3::from_array(&array, &Vec3::new(2.0, 2.0, 2.0)).unwrap()
    }

    #[test]
    fn limits_span_voxel_extents_times_counts() {
        let field = linear_field();
        let limits = field.limits();
        assert_eq!(limits[X], (0.0, 22.0));
        assert_eq!(limits[Y], (0.0, 18.0));
        assert_eq!(limits[Z], (0.0, 14.0));
    }

    #[test]
    fn single_point_displacement_uses_each_component() {
        let array = Array4::from_shape_fn((3, 3, 3, 3), |(_, _, _, c)| (c + 1) as f64);
        let field = DisplacementField3::from_array(&array, &Vec3::new(50.0, 50.0, 50.0)).unwrap();
        let point = Point3::new(120.0, 120.0, 120.0);
        assert_eq!(field.displacement_at(&point), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(
            field.displaced_point(&point),
            Point3::new(121.0, 122.0, 123.0)
        );
    }

    #[test]
    fn uniform_displacement_is_reproduced_exactly() {
        let array = Array4::from_shape_fn((6, 6, 6, 3), |(_, _, _, c)| [5.0, -0.3, 0.1][c]);
        let field =
            DisplacementField3::from_array(&array, &Vec3::equal_components(100.0 / 6.0)).unwrap();
        let coords: Vec<f64> = (0..25).map(|i| i as f64 * 4.377).collect();
        for &x in &coords {
            for &y in &coords {
                for &z in &coords {
                    let displacement = field.displacement_at(&Point3::new(x, y, z));
                    assert_eq!(displacement, Vec3::new(5.0, -0.3, 0.1));
                }
            }
        }
    }

    #[test]
    fn linear_displacement_is_reproduced_inside_grid() {
        let field = linear_field();
        let point = Point3::new(3.3, 7.1, 5.9);
        let expected = Vec3::new(0.1 * 3.3, -0.2 * 7.1, 1.0);
        assert_abs_diff_eq!(field.displacement_at(&point), expected, epsilon = 1e-12);
    }

    #[test]
    fn batch_displacements_match_single_points() {
        let field = linear_field();
        let xs = array![0.0, 3.3, 21.9, 30.0];
        let ys = array![0.0, 7.1, 0.5, -4.0];
        let zs = array![0.0, 5.9, 13.9, 100.0];
        let displacements = field.displacements(&xs, &ys, &zs).unwrap();
        assert_eq!(displacements.dim(), (4, 3));

        for idx in 0..xs.len() {
            let single = field.displacement_at(&Point3::new(xs[idx], ys[idx], zs[idx]));
            for dim in Dim3::slice() {
                assert_abs_diff_eq!(displacements[[idx, dim.num()]], single[dim]);
            }
        }
    }

    #[test]
    fn deformed_points_are_shifted_by_displacement() {
        let field = linear_field();
        let points = array![[1.0, 2.0, 3.0], [10.0, 10.0, 10.0]];
        let deformed = field.deform_points(&points).unwrap();
        assert_eq!(deformed.dim(), points.dim());
        assert_abs_diff_eq!(deformed[[0, 0]], 1.1, epsilon = 1e-12);
        assert_abs_diff_eq!(deformed[[0, 1]], 1.6, epsilon = 1e-12);
        assert_abs_diff_eq!(deformed[[0, 2]], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(deformed[[1, 0]], 11.0, epsilon = 1e-12);
        assert_abs_diff_eq!(deformed[[1, 1]], 8.0, epsilon = 1e-12);
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        let field = linear_field();
        let points = Array2::<f64>::zeros((4, 2));
        assert_eq!(
            field.deform_points(&points),
            Err(GridError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );

        let xs = array![1.0, 2.0];
        let ys = array![1.0];
        assert!(matches!(
            field.displacements(&xs, &ys, &xs),
            Err(GridError::RaggedCoordinates { .. })
        ));

        let two_channels = Array4::<f64>::zeros((3, 3, 3, 2));
        assert!(matches!(
            DisplacementField3::from_array(&two_channels, &Vec3::equal_components(1.0)),
            Err(GridError::Configuration(_))
        ));
    }
}
