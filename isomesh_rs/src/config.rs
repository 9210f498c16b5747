//! Generator configuration.

use isomesh_core::{LatticeDims, LatticeGeometry, Point3, SphereDensity, VertexPlacement};

use crate::collaborators::MaterialId;
use crate::error::{IsoError, Result};

/// Smallest accepted number of lattice points per axis.
pub const MIN_POINTS_PER_AXIS: u32 = 2;

/// Largest accepted number of lattice points per axis.
pub const MAX_POINTS_PER_AXIS: u32 = 100;

/// Parameters that fully determine a regenerated mesh.
///
/// Nothing is persisted between regenerations: every call recomputes the mesh
/// from these values.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Density threshold separating inside (below) from outside (at or above).
    pub iso_level: f32,
    /// Edge length of the sampled cube.
    pub bounds_size: f32,
    /// World-space center of the sampled cube and of the sphere.
    pub offset: Point3,
    /// Lattice points per axis, in `[MIN_POINTS_PER_AXIS, MAX_POINTS_PER_AXIS]`.
    pub points_per_axis: u32,
    /// Hand the mesh to the collision collaborator as a convex shape.
    pub can_collide: bool,
    /// Material handed to the renderer along with the mesh.
    pub material: Option<MaterialId>,
    /// Sphere radius.
    pub radius: f32,
    /// Interpolate vertices along crossing edges instead of using midpoints.
    pub interpolate: bool,
}

impl GeneratorConfig {
    /// Create a configuration for a sphere of `radius` inside a cube of edge
    /// `bounds_size`, sampled with `points_per_axis` points (clamped).
    pub fn new(bounds_size: f32, points_per_axis: u32, radius: f32) -> Self {
        Self::default()
            .with_bounds_size(bounds_size)
            .with_points_per_axis(points_per_axis)
            .with_radius(radius)
    }

    /// Set the iso-level.
    pub fn with_iso_level(mut self, iso_level: f32) -> Self {
        self.iso_level = iso_level;
        self
    }

    /// Set the edge length of the sampled cube.
    pub fn with_bounds_size(mut self, bounds_size: f32) -> Self {
        self.bounds_size = bounds_size;
        self
    }

    /// Set the field origin.
    pub fn with_offset(mut self, offset: Point3) -> Self {
        self.offset = offset;
        self
    }

    /// Set the lattice resolution, clamped to
    /// `[MIN_POINTS_PER_AXIS, MAX_POINTS_PER_AXIS]`.
    pub fn with_points_per_axis(mut self, points_per_axis: u32) -> Self {
        self.points_per_axis = points_per_axis.clamp(MIN_POINTS_PER_AXIS, MAX_POINTS_PER_AXIS);
        self
    }

    /// Enable or disable the convex collider handoff.
    pub fn with_collision(mut self, can_collide: bool) -> Self {
        self.can_collide = can_collide;
        self
    }

    /// Set the render material.
    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    /// Set the sphere radius.
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Toggle edge interpolation.
    pub fn with_interpolation(mut self, interpolate: bool) -> Self {
        self.interpolate = interpolate;
        self
    }

    /// Vertex placement rule for the triangulator.
    #[inline]
    pub fn placement(&self) -> VertexPlacement {
        VertexPlacement::from_interpolate(self.interpolate)
    }

    /// The sphere field described by this configuration.
    #[inline]
    pub fn sphere(&self) -> SphereDensity {
        SphereDensity::new(self.offset, self.radius)
    }

    /// Check every field.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for non-finite values, a resolution outside the
    /// accepted range, or a non-positive bounds size.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_POINTS_PER_AXIS..=MAX_POINTS_PER_AXIS).contains(&self.points_per_axis) {
            return Err(invalid(format!(
                "points_per_axis {} outside [{}, {}]",
                self.points_per_axis, MIN_POINTS_PER_AXIS, MAX_POINTS_PER_AXIS
            )));
        }
        if !(self.bounds_size.is_finite() && self.bounds_size > 0.0) {
            return Err(invalid(format!(
                "bounds_size must be positive and finite, got {}",
                self.bounds_size
            )));
        }
        if !self.iso_level.is_finite() {
            return Err(invalid(format!("iso_level must be finite, got {}", self.iso_level)));
        }
        if !self.radius.is_finite() {
            return Err(invalid(format!("radius must be finite, got {}", self.radius)));
        }
        if !self.offset.is_finite() {
            return Err(invalid(format!("offset must be finite, got {:?}", self.offset)));
        }
        Ok(())
    }

    /// Validated lattice placement for this configuration.
    pub fn geometry(&self) -> Result<LatticeGeometry> {
        self.validate()?;
        let dims = LatticeDims::new(self.points_per_axis)?;
        Ok(LatticeGeometry::new(dims, self.bounds_size, self.offset)?)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            iso_level: 0.0,
            bounds_size: 10.0,
            offset: Point3::ZERO,
            points_per_axis: 10,
            can_collide: false,
            material: None,
            radius: 4.0,
            interpolate: false,
        }
    }
}

fn invalid(message: String) -> IsoError {
    IsoError::InvalidConfig { message }
}
