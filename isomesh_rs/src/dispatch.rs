//! Parallel compute dispatches.
//!
//! Both passes split their index space into groups of
//! [`THREAD_GROUP_SIZE`] per axis and hand the groups to rayon. A dispatch
//! returns only once every group has finished, which is the barrier the next
//! pass relies on.

use rayon::prelude::*;

use isomesh_core::lattice::THREAD_GROUP_SIZE;
use isomesh_core::{
    marching_cubes::process_cell_no_alloc, DensityField, IsoCoreError, LatticeCoord,
    LatticeGeometry, LatticeSample, LatticeView, Triangle, VertexPlacement,
};

use crate::buffers::{AppendBuffer, LatticeBuffer};
use crate::error::Result;

/// Coordinates covered by `group` in a `groups³` dispatch, x fastest.
///
/// Trailing groups run past the lattice edge; callers filter those out.
fn group_coords(group: u32, groups: u32) -> impl Iterator<Item = LatticeCoord> {
    let gx = group % groups;
    let gy = (group / groups) % groups;
    let gz = group / (groups * groups);

    (0..THREAD_GROUP_SIZE).flat_map(move |lz| {
        (0..THREAD_GROUP_SIZE).flat_map(move |ly| {
            (0..THREAD_GROUP_SIZE).map(move |lx| {
                LatticeCoord::new(
                    gx * THREAD_GROUP_SIZE + lx,
                    gy * THREAD_GROUP_SIZE + ly,
                    gz * THREAD_GROUP_SIZE + lz,
                )
            })
        })
    })
}

/// Sample `field` at every lattice point and store the records in `lattice`.
///
/// Points are grouped into `8³` blocks. Threads of a block that fall past the
/// last point do nothing. Records land at their flat index `x + y·N + z·N²`.
///
/// # Errors
/// Returns `LatticeSizeMismatch` when `lattice` was allocated for a different
/// resolution than `geometry`.
pub fn dispatch_sample<F>(
    field: &F,
    geometry: &LatticeGeometry,
    lattice: &mut LatticeBuffer,
) -> Result<()>
where
    F: DensityField + Sync + ?Sized,
{
    let dims = geometry.dims();
    if lattice.dims() != dims {
        return Err(IsoCoreError::LatticeSizeMismatch {
            expected: dims.num_points(),
            got: lattice.len(),
        }
        .into());
    }

    let groups = dims.point_groups_per_axis();
    log::debug!(
        "sample dispatch: {}x{}x{} groups of {}^3 over {} points",
        groups,
        groups,
        groups,
        THREAD_GROUP_SIZE,
        dims.num_points()
    );

    let sampled: Vec<Vec<(usize, LatticeSample)>> = (0..groups * groups * groups)
        .into_par_iter()
        .map(|group| {
            group_coords(group, groups)
                .filter(|coord| dims.contains_point(*coord))
                .map(|coord| (dims.index(coord), geometry.sample(field, coord)))
                .collect()
        })
        .collect();

    let records = lattice.samples_mut();
    for (index, sample) in sampled.into_iter().flatten() {
        records[index] = sample;
    }

    Ok(())
}

/// Run marching cubes over every cell and append the triangles to `out`.
///
/// Cells are grouped into `8³` blocks. Threads of a block that fall past the
/// last cell produce nothing. Appends past the buffer capacity are counted but
/// dropped; the caller detects that at read-back.
pub fn dispatch_triangulate(
    view: &LatticeView<'_>,
    iso_level: f32,
    placement: VertexPlacement,
    out: &AppendBuffer<Triangle>,
) {
    let dims = view.dims();
    let groups = dims.cell_groups_per_axis();
    log::debug!(
        "triangulate dispatch: {}x{}x{} groups of {}^3 over {} cells",
        groups,
        groups,
        groups,
        THREAD_GROUP_SIZE,
        dims.num_cells()
    );

    (0..groups * groups * groups)
        .into_par_iter()
        .for_each(|group| {
            for cell in group_coords(group, groups).filter(|cell| dims.contains_cell(*cell)) {
                let (triangles, count) = process_cell_no_alloc(view, cell, iso_level, placement);
                for triangle in &triangles[..count] {
                    out.append(*triangle);
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use isomesh_core::{LatticeDims, Point3, SphereDensity};

    fn sphere_lattice(n: u32) -> (LatticeGeometry, LatticeBuffer) {
        let dims = LatticeDims::new(n).unwrap();
        let geometry = LatticeGeometry::new(dims, 10.0, Point3::ZERO).unwrap();
        let mut lattice = LatticeBuffer::allocate(dims);
        dispatch_sample(&SphereDensity::new(Point3::ZERO, 4.0), &geometry, &mut lattice).unwrap();
        (geometry, lattice)
    }

    #[test]
    fn test_sample_writes_every_point_at_flat_index() {
        let (geometry, lattice) = sphere_lattice(10);
        let dims = geometry.dims();

        for (i, record) in lattice.samples().iter().enumerate() {
            let coord = dims.coord(i);
            assert_eq!(record.position, geometry.position(coord));
            let expected = record.position.length() - 4.0;
            assert!((record.density - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_sample_fills_partial_trailing_groups() {
        // 9 and 17 points leave a trailing group holding a single layer.
        let field = SphereDensity::new(Point3::new(0.5, -0.25, 1.0), 3.0);
        for n in [9, 17] {
            let dims = LatticeDims::new(n).unwrap();
            let geometry = LatticeGeometry::new(dims, 10.0, Point3::ZERO).unwrap();
            let mut lattice = LatticeBuffer::allocate(dims);
            for record in lattice.samples_mut() {
                *record = LatticeSample::new(Point3::splat(f32::NAN), f32::NAN);
            }

            dispatch_sample(&field, &geometry, &mut lattice).unwrap();

            assert_eq!(dims.point_groups_per_axis() * THREAD_GROUP_SIZE, n + 7);
            for (i, record) in lattice.samples().iter().enumerate() {
                assert_eq!(*record, geometry.sample(&field, dims.coord(i)), "N={} i={}", n, i);
            }
        }
    }

    #[test]
    fn test_group_coords_cover_lattice_once() {
        let dims = LatticeDims::new(9).unwrap();
        let groups = dims.point_groups_per_axis();
        let mut hits = vec![0u32; dims.num_points()];
        for group in 0..groups * groups * groups {
            for coord in group_coords(group, groups).filter(|c| dims.contains_point(*c)) {
                hits[dims.index(coord)] += 1;
            }
        }
        assert!(hits.iter().all(|&h| h == 1));
    }

    #[test]
    fn test_sample_rejects_mismatched_buffer() {
        let dims = LatticeDims::new(10).unwrap();
        let geometry = LatticeGeometry::new(dims, 10.0, Point3::ZERO).unwrap();
        let mut lattice = LatticeBuffer::allocate(LatticeDims::new(6).unwrap());

        let err = dispatch_sample(&|_p: Point3| 0.0, &geometry, &mut lattice).unwrap_err();
        assert!(err.to_string().contains("lattice"));
    }

    #[test]
    fn test_triangulate_matches_serial_count() {
        // 11 points gives 10 cells per axis, so the second group is partial.
        let (_, lattice) = sphere_lattice(11);
        let view = lattice.view().unwrap();
        let dims = view.dims();

        let mut serial = 0;
        for i in 0..dims.num_cells() {
            let cells = dims.cells_per_axis() as usize;
            let cell = LatticeCoord::new(
                (i % cells) as u32,
                ((i / cells) % cells) as u32,
                (i / (cells * cells)) as u32,
            );
            serial += process_cell_no_alloc(&view, cell, 0.0, VertexPlacement::Midpoint).1;
        }

        let out = AppendBuffer::with_capacity(dims.max_triangles());
        dispatch_triangulate(&view, 0.0, VertexPlacement::Midpoint, &out);

        assert!(serial > 0);
        assert_eq!(out.counter(), serial);
    }

    #[test]
    fn test_triangulate_uniform_field_is_empty() {
        let dims = LatticeDims::new(9).unwrap();
        let geometry = LatticeGeometry::new(dims, 2.0, Point3::ZERO).unwrap();
        let mut lattice = LatticeBuffer::allocate(dims);
        dispatch_sample(&|_p: Point3| 1.0, &geometry, &mut lattice).unwrap();

        let out = AppendBuffer::with_capacity(dims.max_triangles());
        dispatch_triangulate(&lattice.view().unwrap(), 0.0, VertexPlacement::Midpoint, &out);
        assert_eq!(out.counter(), 0);
    }
}
