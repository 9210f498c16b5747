//! Lattice indexing and geometry.
//!
//! A lattice is a regular N×N×N grid of sample points covering an axis-aligned
//! box. Points map to a flat index with `x + y·N + z·N²`; the (N-1)³ cells
//! are addressed by their minimum corner.

use crate::density::DensityField;
use crate::error::IsoCoreError;
use crate::types::{LatticeCoord, LatticeSample, Point3, MAX_TRIANGLES_PER_CELL};

/// Number of work items per axis in one dispatch group.
pub const THREAD_GROUP_SIZE: u32 = 8;

/// Number of dispatch groups needed to cover `items` work items along one axis.
#[inline]
pub const fn groups_per_axis(items: u32, group_size: u32) -> u32 {
    items.div_ceil(group_size)
}

/// Validated lattice resolution.
///
/// Holds the number of points per axis, which is always at least 2 so the
/// lattice contains at least one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LatticeDims {
    points_per_axis: u32,
}

impl LatticeDims {
    /// Create lattice dimensions.
    ///
    /// # Errors
    /// Returns `DegenerateLattice` when `points_per_axis < 2`.
    pub const fn new(points_per_axis: u32) -> Result<Self, IsoCoreError> {
        if points_per_axis < 2 {
            return Err(IsoCoreError::DegenerateLattice { points_per_axis });
        }
        Ok(Self { points_per_axis })
    }

    /// Points per axis (N).
    #[inline]
    pub const fn points_per_axis(&self) -> u32 {
        self.points_per_axis
    }

    /// Cells per axis (N - 1).
    #[inline]
    pub const fn cells_per_axis(&self) -> u32 {
        self.points_per_axis - 1
    }

    /// Total number of lattice points (N³).
    #[inline]
    pub const fn num_points(&self) -> usize {
        let n = self.points_per_axis as usize;
        n * n * n
    }

    /// Total number of cells ((N - 1)³).
    #[inline]
    pub const fn num_cells(&self) -> usize {
        let c = self.cells_per_axis() as usize;
        c * c * c
    }

    /// Worst-case triangle count for the whole lattice.
    #[inline]
    pub const fn max_triangles(&self) -> usize {
        self.num_cells() * MAX_TRIANGLES_PER_CELL
    }

    /// Flat index of a lattice point: `x + y·N + z·N²`.
    #[inline]
    pub const fn index(&self, coord: LatticeCoord) -> usize {
        let n = self.points_per_axis as usize;
        coord.x as usize + coord.y as usize * n + coord.z as usize * n * n
    }

    /// Lattice point for a flat index. Inverse of [`LatticeDims::index`].
    #[inline]
    pub const fn coord(&self, index: usize) -> LatticeCoord {
        let n = self.points_per_axis as usize;
        LatticeCoord {
            x: (index % n) as u32,
            y: ((index / n) % n) as u32,
            z: (index / (n * n)) as u32,
        }
    }

    /// Whether `coord` names a lattice point.
    #[inline]
    pub const fn contains_point(&self, coord: LatticeCoord) -> bool {
        coord.x < self.points_per_axis
            && coord.y < self.points_per_axis
            && coord.z < self.points_per_axis
    }

    /// Whether `coord` names a cell (all eight corners inside the lattice).
    #[inline]
    pub const fn contains_cell(&self, coord: LatticeCoord) -> bool {
        let c = self.cells_per_axis();
        coord.x < c && coord.y < c && coord.z < c
    }

    /// Dispatch groups per axis for the point-sampling phase.
    #[inline]
    pub const fn point_groups_per_axis(&self) -> u32 {
        groups_per_axis(self.points_per_axis, THREAD_GROUP_SIZE)
    }

    /// Dispatch groups per axis for the cell-triangulation phase.
    #[inline]
    pub const fn cell_groups_per_axis(&self) -> u32 {
        groups_per_axis(self.cells_per_axis(), THREAD_GROUP_SIZE)
    }
}

/// A lattice placed in world space.
///
/// The lattice spans a cube of edge `bounds_size` centred on `center`, with
/// real-valued spacing `bounds_size / (N - 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeGeometry {
    dims: LatticeDims,
    bounds_size: f32,
    center: Point3,
    spacing: f32,
}

impl LatticeGeometry {
    /// Place `dims` in a box of edge `bounds_size` around `center`.
    ///
    /// # Errors
    /// Returns `InvalidSpacing` when the resulting spacing is not a positive
    /// finite number.
    pub fn new(dims: LatticeDims, bounds_size: f32, center: Point3) -> Result<Self, IsoCoreError> {
        let spacing = bounds_size / dims.cells_per_axis() as f32;
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(IsoCoreError::InvalidSpacing { bounds_size });
        }
        Ok(Self {
            dims,
            bounds_size,
            center,
            spacing,
        })
    }

    /// Lattice resolution.
    #[inline]
    pub const fn dims(&self) -> LatticeDims {
        self.dims
    }

    /// Edge length of the sampled box.
    #[inline]
    pub const fn bounds_size(&self) -> f32 {
        self.bounds_size
    }

    /// Center of the sampled box.
    #[inline]
    pub const fn center(&self) -> Point3 {
        self.center
    }

    /// Distance between neighbouring lattice points.
    #[inline]
    pub const fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Minimum corner of the sampled box.
    #[inline]
    pub fn min_corner(&self) -> Point3 {
        self.center - Point3::splat(self.bounds_size * 0.5)
    }

    /// Maximum corner of the sampled box.
    #[inline]
    pub fn max_corner(&self) -> Point3 {
        self.center + Point3::splat(self.bounds_size * 0.5)
    }

    /// World position of a lattice point: `center + (p - (N-1)/2) · spacing`.
    #[inline]
    pub fn position(&self, coord: LatticeCoord) -> Point3 {
        let half = self.dims.cells_per_axis() as f32 * 0.5;
        Point3::new(
            self.center.x + (coord.x as f32 - half) * self.spacing,
            self.center.y + (coord.y as f32 - half) * self.spacing,
            self.center.z + (coord.z as f32 - half) * self.spacing,
        )
    }

    /// Evaluate `field` at a lattice point.
    #[inline]
    pub fn sample<F: DensityField + ?Sized>(&self, field: &F, coord: LatticeCoord) -> LatticeSample {
        let position = self.position(coord);
        LatticeSample::new(position, field.density(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::SphereDensity;

    #[test]
    fn test_degenerate_dims_rejected() {
        assert_eq!(
            LatticeDims::new(0),
            Err(IsoCoreError::DegenerateLattice { points_per_axis: 0 })
        );
        assert_eq!(
            LatticeDims::new(1),
            Err(IsoCoreError::DegenerateLattice { points_per_axis: 1 })
        );
        assert!(LatticeDims::new(2).is_ok());
    }

    #[test]
    fn test_dims_counts() {
        let dims = LatticeDims::new(10).unwrap();
        assert_eq!(dims.cells_per_axis(), 9);
        assert_eq!(dims.num_points(), 1000);
        assert_eq!(dims.num_cells(), 729);
        assert_eq!(dims.max_triangles(), 729 * 5);
        assert_eq!(dims.point_groups_per_axis(), 2);
        assert_eq!(dims.cell_groups_per_axis(), 2);
    }

    #[test]
    fn test_flat_index_mapping() {
        let dims = LatticeDims::new(4).unwrap();

        assert_eq!(dims.index(LatticeCoord::new(0, 0, 0)), 0);
        assert_eq!(dims.index(LatticeCoord::new(1, 0, 0)), 1);
        assert_eq!(dims.index(LatticeCoord::new(0, 1, 0)), 4);
        assert_eq!(dims.index(LatticeCoord::new(0, 0, 1)), 16);

        for i in 0..dims.num_points() {
            assert_eq!(dims.index(dims.coord(i)), i);
        }
    }

    #[test]
    fn test_groups_per_axis() {
        assert_eq!(groups_per_axis(1, 8), 1);
        assert_eq!(groups_per_axis(8, 8), 1);
        assert_eq!(groups_per_axis(9, 8), 2);
        assert_eq!(groups_per_axis(100, 8), 13);
    }

    #[test]
    fn test_geometry_spans_bounds() {
        let dims = LatticeDims::new(10).unwrap();
        let geom = LatticeGeometry::new(dims, 10.0, Point3::ZERO).unwrap();

        assert!((geom.spacing() - 10.0 / 9.0).abs() < 1e-6);

        let lo = geom.position(LatticeCoord::new(0, 0, 0));
        let hi = geom.position(LatticeCoord::new(9, 9, 9));
        assert!((lo.x + 5.0).abs() < 1e-5);
        assert!((hi.z - 5.0).abs() < 1e-5);
        assert_eq!(geom.min_corner(), Point3::splat(-5.0));
        assert_eq!(geom.max_corner(), Point3::splat(5.0));
    }

    #[test]
    fn test_geometry_spacing_is_real_valued() {
        // 3 / 2 would truncate to 1 with integer division
        let dims = LatticeDims::new(3).unwrap();
        let geom = LatticeGeometry::new(dims, 3.0, Point3::ZERO).unwrap();
        assert_eq!(geom.spacing(), 1.5);
    }

    #[test]
    fn test_geometry_invalid_spacing() {
        let dims = LatticeDims::new(4).unwrap();
        assert!(LatticeGeometry::new(dims, 0.0, Point3::ZERO).is_err());
        assert!(LatticeGeometry::new(dims, -1.0, Point3::ZERO).is_err());
        assert!(LatticeGeometry::new(dims, f32::NAN, Point3::ZERO).is_err());
        assert!(LatticeGeometry::new(dims, f32::INFINITY, Point3::ZERO).is_err());
    }

    #[test]
    fn test_sample_evaluates_field() {
        let dims = LatticeDims::new(3).unwrap();
        let center = Point3::new(1.0, 2.0, 3.0);
        let geom = LatticeGeometry::new(dims, 2.0, center).unwrap();
        let sphere = SphereDensity::new(center, 0.5);

        let mid = geom.sample(&sphere, LatticeCoord::new(1, 1, 1));
        assert_eq!(mid.position, center);
        assert!((mid.density + 0.5).abs() < 1e-6);
    }
}
