//! Marching Cubes per-cell triangulation.
//!
//! Provides functions to classify a lattice cell against an iso-level and
//! emit the triangles the lookup tables prescribe for it.

use crate::error::IsoCoreError;
use crate::lattice::LatticeDims;
use crate::types::{LatticeCoord, LatticeSample, Point3, Triangle, MAX_TRIANGLES_PER_CELL};

use super::tables::{CORNER_OFFSETS, EDGE_TABLE, EDGE_VERTICES, TRI_TABLE};

/// Where a surface vertex is placed on a crossing edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VertexPlacement {
    /// Halfway between the two edge corners.
    #[default]
    Midpoint,
    /// Linear interpolation of the corner densities, clamped to the edge.
    Interpolated,
}

impl VertexPlacement {
    /// `Interpolated` when `interpolate` is set, `Midpoint` otherwise.
    #[inline]
    pub const fn from_interpolate(interpolate: bool) -> Self {
        if interpolate {
            VertexPlacement::Interpolated
        } else {
            VertexPlacement::Midpoint
        }
    }
}

/// Read-only view over a fully sampled lattice.
#[derive(Debug, Clone, Copy)]
pub struct LatticeView<'a> {
    dims: LatticeDims,
    samples: &'a [LatticeSample],
}

impl<'a> LatticeView<'a> {
    /// Wrap `samples`, which must hold exactly one record per lattice point.
    ///
    /// # Errors
    /// Returns `LatticeSizeMismatch` if `samples.len() != dims.num_points()`.
    pub fn new(dims: LatticeDims, samples: &'a [LatticeSample]) -> Result<Self, IsoCoreError> {
        if samples.len() != dims.num_points() {
            return Err(IsoCoreError::LatticeSizeMismatch {
                expected: dims.num_points(),
                got: samples.len(),
            });
        }
        Ok(Self { dims, samples })
    }

    /// Lattice resolution.
    #[inline]
    pub const fn dims(&self) -> LatticeDims {
        self.dims
    }

    /// Sample at a lattice point.
    #[inline]
    pub fn get(&self, coord: LatticeCoord) -> Option<LatticeSample> {
        if !self.dims.contains_point(coord) {
            return None;
        }
        self.samples.get(self.dims.index(coord)).copied()
    }

    /// All samples in flat index order.
    #[inline]
    pub const fn samples(&self) -> &'a [LatticeSample] {
        self.samples
    }
}

/// Interpolate vertex position along an edge where the field crosses the iso-value.
///
/// # Arguments
/// * `p0` - Position of the first corner
/// * `p1` - Position of the second corner
/// * `v0` - Density at the first corner
/// * `v1` - Density at the second corner
/// * `iso_value` - The iso-surface value
///
/// # Returns
/// The interpolated position, clamped to the segment `p0..p1`.
#[inline]
pub fn interpolate_vertex(p0: Point3, p1: Point3, v0: f32, v1: f32, iso_value: f32) -> Point3 {
    // Avoid division by zero for degenerate cases
    let denom = v1 - v0;
    if libm::fabsf(denom) < 1e-10 {
        return p0.lerp(p1, 0.5);
    }

    let t = (iso_value - v0) / denom;

    // Clamp to [0, 1] to handle numerical errors
    let t = t.clamp(0.0, 1.0);

    p0.lerp(p1, t)
}

/// Surface vertex on the edge between two lattice samples.
///
/// `s0` must be the sample with the lower flat lattice index so that the two
/// cells sharing an edge compute bit-identical vertices.
#[inline]
pub fn edge_vertex(
    s0: LatticeSample,
    s1: LatticeSample,
    iso_value: f32,
    placement: VertexPlacement,
) -> Point3 {
    match placement {
        VertexPlacement::Midpoint => s0.position.lerp(s1.position, 0.5),
        VertexPlacement::Interpolated => {
            interpolate_vertex(s0.position, s1.position, s0.density, s1.density, iso_value)
        }
    }
}

/// Compute the cube configuration index from corner densities.
///
/// # Returns
/// An 8-bit index where bit i is set if corner i is inside the surface
/// (density < iso_value).
#[inline]
pub fn compute_cube_index(corner_values: &[f32; 8], iso_value: f32) -> usize {
    let mut index = 0;
    for (i, &val) in corner_values.iter().enumerate() {
        if val < iso_value {
            index |= 1 << i;
        }
    }
    index
}

/// Gather the eight corner samples of `cell`, plus their flat lattice indices.
#[inline]
fn gather_corners(
    view: &LatticeView<'_>,
    cell: LatticeCoord,
) -> Option<([LatticeSample; 8], [usize; 8])> {
    if !view.dims.contains_cell(cell) {
        return None;
    }

    let mut samples = [LatticeSample::default(); 8];
    let mut indices = [0usize; 8];
    for (i, &offset) in CORNER_OFFSETS.iter().enumerate() {
        let coord = cell.offset(offset);
        indices[i] = view.dims.index(coord);
        samples[i] = view.samples[indices[i]];
    }
    Some((samples, indices))
}

/// Compute the vertex on every edge flagged in `edge_flags`.
#[inline]
fn crossing_vertices(
    samples: &[LatticeSample; 8],
    indices: &[usize; 8],
    edge_flags: u16,
    iso_value: f32,
    placement: VertexPlacement,
) -> [Point3; 12] {
    let mut edge_vertices = [Point3::default(); 12];
    for (edge_idx, &(c0, c1)) in EDGE_VERTICES.iter().enumerate() {
        if (edge_flags & (1 << edge_idx)) == 0 {
            continue;
        }
        let (lo, hi) = if indices[c0] <= indices[c1] {
            (c0, c1)
        } else {
            (c1, c0)
        };
        edge_vertices[edge_idx] = edge_vertex(samples[lo], samples[hi], iso_value, placement);
    }
    edge_vertices
}

/// Process a single cell without dynamic allocation.
///
/// Returns a fixed-size array that can hold up to five triangles (the maximum
/// for any marching cubes configuration) and the number of valid entries.
/// A cell outside the lattice yields `(default, 0)`, matching a dispatch
/// thread that falls past the end of the cell range.
pub fn process_cell_no_alloc(
    view: &LatticeView<'_>,
    cell: LatticeCoord,
    iso_value: f32,
    placement: VertexPlacement,
) -> ([Triangle; MAX_TRIANGLES_PER_CELL], usize) {
    let mut triangles = [Triangle::default(); MAX_TRIANGLES_PER_CELL];

    let Some((samples, indices)) = gather_corners(view, cell) else {
        return (triangles, 0);
    };

    let mut corner_values = [0.0f32; 8];
    for (value, sample) in corner_values.iter_mut().zip(samples.iter()) {
        *value = sample.density;
    }

    let cube_index = compute_cube_index(&corner_values, iso_value);

    let edge_flags = EDGE_TABLE[cube_index];
    if edge_flags == 0 {
        return (triangles, 0);
    }

    let edge_vertices = crossing_vertices(&samples, &indices, edge_flags, iso_value, placement);

    let mut count = 0;
    let tri_list = &TRI_TABLE[cube_index];
    let mut i = 0;
    while i < 16 && tri_list[i] != -1 && count < MAX_TRIANGLES_PER_CELL {
        let e0 = tri_list[i] as usize;
        let e1 = tri_list[i + 1] as usize;
        let e2 = tri_list[i + 2] as usize;

        triangles[count] = Triangle::new(edge_vertices[e0], edge_vertices[e1], edge_vertices[e2]);
        count += 1;
        i += 3;
    }

    (triangles, count)
}

/// Process a single cell and collect its triangles into a vector.
#[cfg(any(feature = "std", feature = "alloc"))]
pub fn process_cell(
    view: &LatticeView<'_>,
    cell: LatticeCoord,
    iso_value: f32,
    placement: VertexPlacement,
) -> crate::alloc_prelude::Vec<Triangle> {
    let (triangles, count) = process_cell_no_alloc(view, cell, iso_value, placement);
    triangles[..count].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::{DensityField, SphereDensity};
    use crate::lattice::LatticeGeometry;

    /// Sample `field` onto a lattice of `n` points per axis spanning `bounds`.
    fn sample_lattice<F: DensityField>(
        field: &F,
        n: u32,
        bounds: f32,
    ) -> (LatticeDims, [LatticeSample; 64]) {
        let dims = LatticeDims::new(n).unwrap();
        assert!(dims.num_points() <= 64);
        let geom = LatticeGeometry::new(dims, bounds, Point3::ZERO).unwrap();

        let mut samples = [LatticeSample::default(); 64];
        for (i, sample) in samples.iter_mut().enumerate().take(dims.num_points()) {
            *sample = geom.sample(field, dims.coord(i));
        }
        (dims, samples)
    }

    #[test]
    fn test_interpolate_vertex_midpoint() {
        let p0 = Point3::new(0.0, 0.0, 0.0);
        let p1 = Point3::new(1.0, 0.0, 0.0);

        // Equal and opposite values -> midpoint
        let result = interpolate_vertex(p0, p1, -1.0, 1.0, 0.0);
        assert!((result.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_interpolate_vertex_at_corners() {
        let p0 = Point3::new(0.0, 0.0, 0.0);
        let p1 = Point3::new(1.0, 0.0, 0.0);

        let result = interpolate_vertex(p0, p1, 0.0, 1.0, 0.0);
        assert!((result.x - 0.0).abs() < 1e-6);

        let result = interpolate_vertex(p0, p1, -1.0, 0.0, 0.0);
        assert!((result.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_interpolate_vertex_clamped() {
        let p0 = Point3::new(0.0, 0.0, 0.0);
        let p1 = Point3::new(1.0, 0.0, 0.0);

        // Iso outside the [v0, v1] range stays on the edge
        let result = interpolate_vertex(p0, p1, 1.0, 2.0, 0.0);
        assert_eq!(result, p0);
        let result = interpolate_vertex(p0, p1, 1.0, 2.0, 5.0);
        assert_eq!(result, p1);

        // Flat edge falls back to the midpoint
        let result = interpolate_vertex(p0, p1, 0.3, 0.3, 0.0);
        assert_eq!(result, Point3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_edge_vertex_placement() {
        let s0 = LatticeSample::new(Point3::new(0.0, 0.0, 0.0), -0.25);
        let s1 = LatticeSample::new(Point3::new(1.0, 0.0, 0.0), 0.75);

        let mid = edge_vertex(s0, s1, 0.0, VertexPlacement::Midpoint);
        assert_eq!(mid, Point3::new(0.5, 0.0, 0.0));

        let lerped = edge_vertex(s0, s1, 0.0, VertexPlacement::Interpolated);
        assert!((lerped.x - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_compute_cube_index() {
        let values = [1.0; 8];
        assert_eq!(compute_cube_index(&values, 0.0), 0);

        let values = [-1.0; 8];
        assert_eq!(compute_cube_index(&values, 0.0), 255);

        let mut values = [1.0; 8];
        values[0] = -1.0;
        assert_eq!(compute_cube_index(&values, 0.0), 1);

        values[1] = -1.0;
        assert_eq!(compute_cube_index(&values, 0.0), 3);

        // Exactly on the iso-level counts as outside
        let values = [0.0; 8];
        assert_eq!(compute_cube_index(&values, 0.0), 0);
    }

    #[test]
    fn test_lattice_view_size_checked() {
        let dims = LatticeDims::new(3).unwrap();
        let samples = [LatticeSample::default(); 8];
        assert_eq!(
            LatticeView::new(dims, &samples).unwrap_err(),
            IsoCoreError::LatticeSizeMismatch {
                expected: 27,
                got: 8
            }
        );
    }

    #[test]
    fn test_single_cell_with_one_inside_corner() {
        let dims = LatticeDims::new(2).unwrap();
        let geom = LatticeGeometry::new(dims, 1.0, Point3::ZERO).unwrap();
        let mut samples = [LatticeSample::default(); 8];
        for (i, sample) in samples.iter_mut().enumerate() {
            let position = geom.position(dims.coord(i));
            *sample = LatticeSample::new(position, if i == 0 { -1.0 } else { 1.0 });
        }
        let view = LatticeView::new(dims, &samples).unwrap();

        let (triangles, count) =
            process_cell_no_alloc(&view, LatticeCoord::new(0, 0, 0), 0.0, VertexPlacement::Midpoint);
        assert_eq!(count, 1);

        // Each vertex sits halfway along an edge leaving corner 0
        let origin = samples[0].position;
        for k in 0..3 {
            let d = triangles[0][k] - origin;
            let along: f32 = d.x.abs() + d.y.abs() + d.z.abs();
            assert!((along - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cell_out_of_bounds_is_empty() {
        let sphere = SphereDensity::new(Point3::ZERO, 0.8);
        let (dims, samples) = sample_lattice(&sphere, 4, 2.0);
        let view = LatticeView::new(dims, &samples[..dims.num_points()]).unwrap();

        let (_, count) =
            process_cell_no_alloc(&view, LatticeCoord::new(3, 0, 0), 0.0, VertexPlacement::Midpoint);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_sphere_cells_bounded() {
        let sphere = SphereDensity::new(Point3::ZERO, 0.8);
        let (dims, samples) = sample_lattice(&sphere, 4, 2.0);
        let view = LatticeView::new(dims, &samples[..dims.num_points()]).unwrap();

        let mut total = 0;
        for z in 0..3 {
            for y in 0..3 {
                for x in 0..3 {
                    let (triangles, count) = process_cell_no_alloc(
                        &view,
                        LatticeCoord::new(x, y, z),
                        0.0,
                        VertexPlacement::Interpolated,
                    );
                    assert!(count <= MAX_TRIANGLES_PER_CELL);
                    for tri in &triangles[..count] {
                        for v in tri.corners() {
                            assert!(v.is_finite());
                        }
                    }
                    total += count;
                }
            }
        }
        assert!(total > 0, "sphere should cross the lattice");
    }

    #[test]
    #[cfg(any(feature = "std", feature = "alloc"))]
    fn test_alloc_and_no_alloc_match() {
        let sphere = SphereDensity::new(Point3::ZERO, 0.8);
        let (dims, samples) = sample_lattice(&sphere, 4, 2.0);
        let view = LatticeView::new(dims, &samples[..dims.num_points()]).unwrap();
        let cell = LatticeCoord::new(1, 1, 0);

        let alloc = process_cell(&view, cell, 0.0, VertexPlacement::Interpolated);
        let (fixed, count) = process_cell_no_alloc(&view, cell, 0.0, VertexPlacement::Interpolated);

        assert_eq!(alloc.len(), count);
        assert_eq!(&alloc[..], &fixed[..count]);
    }

    #[test]
    #[cfg(feature = "std")]
    fn test_shared_edge_vertices_identical() {
        // Two neighbouring cells traverse their shared edges in opposite
        // directions; vertex positions must still agree bit for bit.
        let sphere = SphereDensity::new(Point3::new(0.1, -0.05, 0.02), 0.9);
        let (dims, samples) = sample_lattice(&sphere, 4, 2.0);
        let view = LatticeView::new(dims, &samples[..dims.num_points()]).unwrap();

        for placement in [VertexPlacement::Midpoint, VertexPlacement::Interpolated] {
            let (left, lc) = process_cell_no_alloc(&view, LatticeCoord::new(0, 0, 1), 0.0, placement);
            let (right, rc) = process_cell_no_alloc(&view, LatticeCoord::new(1, 0, 1), 0.0, placement);

            // Vertices on the shared face x = x1 appear in both cells
            let shared_x = samples[dims.index(LatticeCoord::new(1, 0, 0))].position.x;
            let on_face = |t: &Triangle| {
                t.corners()
                    .into_iter()
                    .filter(|v| v.x == shared_x)
                    .collect::<std::vec::Vec<_>>()
            };
            let mut a: std::vec::Vec<[u32; 3]> = left[..lc]
                .iter()
                .flat_map(on_face)
                .map(|v| [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()])
                .collect();
            let mut b: std::vec::Vec<[u32; 3]> = right[..rc]
                .iter()
                .flat_map(on_face)
                .map(|v| [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()])
                .collect();
            a.sort_unstable();
            a.dedup();
            b.sort_unstable();
            b.dedup();
            assert!(!a.is_empty(), "shared face should be crossed");
            assert_eq!(a, b);
        }
    }
}
