//! Mesh assembly and export.
//!
//! Turns the flat triangle list read back from the triangulator into an
//! indexed mesh. Vertices are not welded: triangle `i` owns vertices
//! `3i, 3i+1, 3i+2`, and the index buffer is the identity.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use isomesh_core::{Point3, Triangle};

use crate::error::Result;

/// An indexed triangle mesh with per-vertex normals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions, three per triangle.
    pub vertices: Vec<Point3>,
    /// Triangle indices into `vertices`, three per triangle.
    pub indices: Vec<u32>,
    /// One unit normal per vertex.
    pub normals: Vec<Point3>,
}

impl Mesh {
    /// Assemble a mesh from triangles, preserving their order, and compute
    /// normals.
    pub fn from_triangles(triangles: &[Triangle]) -> Self {
        let mut vertices = Vec::with_capacity(triangles.len() * 3);
        for triangle in triangles {
            vertices.extend_from_slice(&triangle.corners());
        }
        let indices = (0..vertices.len() as u32).collect();

        let mut mesh = Self {
            vertices,
            indices,
            normals: Vec::new(),
        };
        mesh.recalculate_normals();
        mesh
    }

    /// Number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// True when the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Triangle `i`, or `None` past the end.
    pub fn triangle(&self, i: usize) -> Option<Triangle> {
        self.face(self.indices.get(i * 3..i * 3 + 3)?)
    }

    /// Iterate over the triangles in index order.
    ///
    /// Triangles referencing a vertex past the end of `vertices` are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.chunks_exact(3).filter_map(move |idx| self.face(idx))
    }

    fn face(&self, idx: &[u32]) -> Option<Triangle> {
        let vertex = |k: usize| self.vertices.get(idx[k] as usize).copied();
        Some(Triangle::new(vertex(0)?, vertex(1)?, vertex(2)?))
    }

    /// Recompute vertex normals from the faces that reference each vertex.
    ///
    /// Face normals are area weighted. With unshared vertices every triangle's
    /// corners get its own face normal. Vertices touching only degenerate
    /// faces get a zero normal.
    pub fn recalculate_normals(&mut self) {
        let mut normals = vec![Point3::ZERO; self.vertices.len()];

        for idx in self.indices.chunks_exact(3) {
            let Some(t) = self.face(idx) else {
                continue;
            };
            let (a, b, c) = (idx[0] as usize, idx[1] as usize, idx[2] as usize);
            let face = t.cross();
            normals[a] = normals[a] + face;
            normals[b] = normals[b] + face;
            normals[c] = normals[c] + face;
        }

        for n in &mut normals {
            *n = n.normalize();
        }
        self.normals = normals;
    }

    /// Summary statistics.
    pub fn stats(&self) -> MeshStats {
        MeshStats::from_mesh(self)
    }

    /// Write the mesh in Wavefront OBJ format.
    pub fn write_obj<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "# isomesh generated mesh")?;
        writeln!(
            out,
            "# {} triangles, {} vertices",
            self.triangle_count(),
            self.vertex_count()
        )?;
        writeln!(out)?;

        for v in &self.vertices {
            writeln!(out, "v {} {} {}", v.x, v.y, v.z)?;
        }
        for n in &self.normals {
            writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
        }

        writeln!(out)?;

        // OBJ indices are 1-based
        for idx in self.indices.chunks_exact(3) {
            let (a, b, c) = (idx[0] + 1, idx[1] + 1, idx[2] + 1);
            writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
        }
        out.flush()
    }

    /// Render the mesh as an OBJ string.
    pub fn to_obj(&self) -> io::Result<String> {
        let mut buf = Vec::new();
        self.write_obj(&mut buf)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save the mesh as an OBJ file.
    pub fn save_obj<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.write_obj(BufWriter::new(file))?;
        log::info!("wrote {} triangles to {}", self.triangle_count(), path.display());
        Ok(())
    }
}

/// Mesh statistics after extraction.
#[derive(Debug, Clone, Copy)]
pub struct MeshStats {
    /// Total number of triangles.
    pub triangle_count: usize,
    /// Number of vertices (triangle_count * 3).
    pub vertex_count: usize,
    /// Sum of triangle areas.
    pub surface_area: f32,
    /// Bounding box minimum.
    pub bbox_min: Point3,
    /// Bounding box maximum.
    pub bbox_max: Point3,
}

impl MeshStats {
    /// Compute statistics from a set of triangles.
    pub fn from_triangles<I>(triangles: I) -> Self
    where
        I: IntoIterator<Item = Triangle>,
    {
        let mut triangle_count = 0;
        let mut surface_area = 0.0;
        let mut bbox_min = Point3::splat(f32::MAX);
        let mut bbox_max = Point3::splat(f32::MIN);

        for tri in triangles {
            triangle_count += 1;
            for v in tri.corners() {
                bbox_min = bbox_min.min(v);
                bbox_max = bbox_max.max(v);
            }
            surface_area += tri.area();
        }

        Self {
            triangle_count,
            vertex_count: triangle_count * 3,
            surface_area,
            bbox_min,
            bbox_max,
        }
    }

    /// Compute statistics for a mesh.
    pub fn from_mesh(mesh: &Mesh) -> Self {
        Self::from_triangles(mesh.triangles())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> Vec<Triangle> {
        vec![
            Triangle::new(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ),
            Triangle::new(
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(0.0, 1.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
            ),
        ]
    }

    #[test]
    fn test_assembly_layout() {
        let tris = two_triangles();
        let mesh = Mesh::from_triangles(&tris);

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.normals.len(), 6);
        for (i, tri) in tris.iter().enumerate() {
            assert_eq!(mesh.triangle(i), Some(*tri));
            for k in 0..3 {
                assert_eq!(mesh.vertices[3 * i + k], tri[k]);
            }
        }
        assert_eq!(mesh.triangle(2), None);
    }

    #[test]
    fn test_flat_normals() {
        let mesh = Mesh::from_triangles(&two_triangles());

        for n in &mesh.normals[0..3] {
            assert!((n.z - 1.0).abs() < 1e-6);
        }
        for n in &mesh.normals[3..6] {
            assert!((n.z + 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::from_triangles(&[]);
        assert!(mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.normals.is_empty());
        assert_eq!(mesh.stats().triangle_count, 0);
    }

    #[test]
    fn test_mesh_stats() {
        let mesh = Mesh::from_triangles(&two_triangles());
        let stats = mesh.stats();

        assert_eq!(stats.triangle_count, 2);
        assert_eq!(stats.vertex_count, 6);
        assert!((stats.surface_area - 1.0).abs() < 1e-6);
        assert_eq!(stats.bbox_min, Point3::ZERO);
        assert_eq!(stats.bbox_max, Point3::splat(1.0));
    }

    #[test]
    fn test_to_obj() {
        let mesh = Mesh::from_triangles(&two_triangles()[..1]);
        let obj = mesh.to_obj().unwrap();

        assert!(obj.contains("v 0 0 0"));
        assert!(obj.contains("v 1 0 0"));
        assert!(obj.contains("vn 0 0 1"));
        assert!(obj.contains("f 1//1 2//2 3//3"));
    }

    #[test]
    fn test_out_of_range_index_is_skipped() {
        let mut mesh = Mesh::from_triangles(&two_triangles());
        mesh.indices[0] = 99;

        assert_eq!(mesh.triangle(0), None);
        assert_eq!(mesh.triangle(1), Some(two_triangles()[1]));
        assert_eq!(mesh.triangles().count(), 1);

        mesh.recalculate_normals();
        assert_eq!(mesh.normals[0], Point3::ZERO);
        assert!((mesh.normals[3].z + 1.0).abs() < 1e-6);
    }
}
