//! Density field abstraction.
//!
//! A density field maps a world-space position to a scalar. The sign of
//! `density - iso_level` decides whether a point is inside (negative) or
//! outside (positive) the extracted surface.

use crate::types::Point3;

/// Trait for scalar fields that can be sampled onto a lattice.
///
/// Implementations must be pure: the same position always yields the same
/// value and evaluation has no side effects, so lattice points can be
/// evaluated independently and in any order.
///
/// Any `Fn(Point3) -> f32` closure is a density field:
///
/// ```
/// use isomesh_core::{DensityField, Point3};
///
/// let plane = |p: Point3| p.y;
/// assert_eq!(plane.density(Point3::new(0.0, -2.0, 0.0)), -2.0);
/// ```
pub trait DensityField {
    /// Evaluate the field at `point`.
    fn density(&self, point: Point3) -> f32;
}

impl<F> DensityField for F
where
    F: Fn(Point3) -> f32,
{
    #[inline]
    fn density(&self, point: Point3) -> f32 {
        self(point)
    }
}

/// Signed distance field of a sphere.
///
/// Zero on the surface, negative inside, positive outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereDensity {
    /// Sphere center in world space.
    pub center: Point3,
    /// Sphere radius.
    pub radius: f32,
}

impl SphereDensity {
    /// Create a sphere field.
    #[inline]
    pub const fn new(center: Point3, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl DensityField for SphereDensity {
    #[inline]
    fn density(&self, point: Point3) -> f32 {
        sphere_density(point, self.radius, self.center)
    }
}

/// Sphere distance field as a free function: `|point - center| - radius`.
#[inline]
pub fn sphere_density(point: Point3, radius: f32, center: Point3) -> f32 {
    point.distance(center) - radius
}
