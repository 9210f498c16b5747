//! Hooks through which a finished mesh leaves the generator.
//!
//! Rendering and physics live outside this crate; they implement these traits
//! and receive the mesh after each regeneration.

use crate::mesh::Mesh;

/// Opaque handle to a render material owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

/// Receives meshes for display.
pub trait MeshSink {
    /// Show `mesh`, drawn with `material` if one is configured.
    fn present(&mut self, mesh: &Mesh, material: Option<MaterialId>);
}

/// Receives meshes as collision shapes.
pub trait CollisionSink {
    /// Attach `mesh` as a convex collider.
    fn attach_convex(&mut self, mesh: &Mesh);
}

impl<T: MeshSink + ?Sized> MeshSink for &mut T {
    fn present(&mut self, mesh: &Mesh, material: Option<MaterialId>) {
        (**self).present(mesh, material);
    }
}

impl<T: CollisionSink + ?Sized> CollisionSink for &mut T {
    fn attach_convex(&mut self, mesh: &Mesh) {
        (**self).attach_convex(mesh);
    }
}
