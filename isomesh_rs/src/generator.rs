//! The regeneration pipeline.
//!
//! A [`SurfaceGenerator`] owns its configuration, an optional density field
//! and the last mesh it produced. Each [`regenerate`](SurfaceGenerator::regenerate)
//! call runs
//!
//! 1. allocate the lattice, triangle and count buffers
//! 2. sample the field at every lattice point
//! 3. reset the append counter and triangulate every cell
//! 4. copy the counter out and read back that many triangles
//! 5. assemble the mesh, then release all three buffers
//!
//! and replaces the previous mesh. Nothing else carries over between calls.

use std::fmt;
use std::sync::Arc;

use isomesh_core::{DensityField, LatticeSample};

use crate::buffers::{BufferLease, LatticeBuffer, ResourceTracker, TransientBuffers};
use crate::collaborators::{CollisionSink, MeshSink};
use crate::config::GeneratorConfig;
use crate::dispatch::{dispatch_sample, dispatch_triangulate};
use crate::error::{IsoError, Result};
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::mesh::Mesh;

/// Where the generator gets its densities.
enum FieldSource {
    /// The sphere described by the current configuration.
    Sphere,
    /// A caller-supplied field.
    Custom(Box<dyn DensityField + Send + Sync>),
}

impl fmt::Debug for FieldSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSource::Sphere => f.write_str("Sphere"),
            FieldSource::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Regenerates an isosurface mesh on demand.
///
/// # Example
///
/// ```
/// use isomesh_rs::{GeneratorConfig, SurfaceGenerator};
///
/// let mut generator = SurfaceGenerator::sphere(GeneratorConfig::new(10.0, 10, 4.0));
/// let mesh = generator.regenerate().unwrap();
/// assert!(mesh.triangle_count() > 0);
/// ```
#[derive(Debug)]
pub struct SurfaceGenerator {
    config: GeneratorConfig,
    field: Option<FieldSource>,
    tracker: Arc<ResourceTracker>,
    lifecycle: Lifecycle,
    mesh: Option<Mesh>,
    regenerations: u64,
}

impl SurfaceGenerator {
    /// A generator with no density field attached.
    ///
    /// [`regenerate`](Self::regenerate) fails with `MissingDensityField` until
    /// a field is attached.
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            field: None,
            tracker: Arc::new(ResourceTracker::new()),
            lifecycle: Lifecycle::new(),
            mesh: None,
            regenerations: 0,
        }
    }

    /// A generator sampling the configured sphere.
    pub fn sphere(config: GeneratorConfig) -> Self {
        let mut generator = Self::new(config);
        generator.field = Some(FieldSource::Sphere);
        generator
    }

    /// A generator sampling `field`.
    pub fn with_field<F>(config: GeneratorConfig, field: F) -> Self
    where
        F: DensityField + Send + Sync + 'static,
    {
        let mut generator = Self::new(config);
        generator.set_field(field);
        generator
    }

    /// Replace the density field.
    pub fn set_field<F>(&mut self, field: F)
    where
        F: DensityField + Send + Sync + 'static,
    {
        self.field = Some(FieldSource::Custom(Box::new(field)));
    }

    /// Sample the configured sphere again.
    pub fn use_sphere(&mut self) {
        self.field = Some(FieldSource::Sphere);
    }

    /// Detach the density field.
    pub fn clear_field(&mut self) {
        self.field = None;
    }

    /// True when a density field is attached.
    #[inline]
    pub fn has_field(&self) -> bool {
        self.field.is_some()
    }

    /// Current configuration.
    #[inline]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Mutable configuration, applied on the next regeneration.
    #[inline]
    pub fn config_mut(&mut self) -> &mut GeneratorConfig {
        &mut self.config
    }

    /// Resource accounting for this generator's transient buffers.
    #[inline]
    pub fn resources(&self) -> &Arc<ResourceTracker> {
        &self.tracker
    }

    /// Current pipeline stage. `Idle` between calls.
    #[inline]
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Number of successful regenerations.
    #[inline]
    pub fn regenerations(&self) -> u64 {
        self.regenerations
    }

    /// The last generated mesh.
    #[inline]
    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    /// Take ownership of the last generated mesh.
    pub fn take_mesh(&mut self) -> Option<Mesh> {
        self.mesh.take()
    }

    /// Rebuild the mesh from the current configuration and field.
    ///
    /// The new mesh replaces the previous one. On error the previous mesh is
    /// kept, and in every case the transient buffers are released and the
    /// generator is back in `Idle` when this returns.
    ///
    /// # Errors
    /// - `MissingDensityField` when no field is attached
    /// - `InvalidConfig` or `Lattice` for a rejected configuration
    /// - `TriangleOverflow` when the triangulator exceeded its buffer
    pub fn regenerate(&mut self) -> Result<&Mesh> {
        let outcome = self.run_pipeline();
        self.lifecycle.reset();

        match outcome {
            Ok(mesh) => {
                self.regenerations += 1;
                if mesh.is_empty() {
                    log::warn!(
                        "regeneration produced an empty mesh (iso_level {}, radius {}, bounds {})",
                        self.config.iso_level,
                        self.config.radius,
                        self.config.bounds_size
                    );
                } else {
                    log::info!(
                        "regenerated mesh: {} triangles at {}^3 points",
                        mesh.triangle_count(),
                        self.config.points_per_axis
                    );
                }
                Ok(self.mesh.insert(mesh))
            }
            Err(e) => {
                log::error!("regeneration failed: {}", e);
                Err(e)
            }
        }
    }

    fn run_pipeline(&mut self) -> Result<Mesh> {
        let sphere;
        let field: &(dyn DensityField + Sync) = match &self.field {
            Some(FieldSource::Sphere) => {
                sphere = self.config.sphere();
                &sphere
            }
            Some(FieldSource::Custom(field)) => &**field,
            None => return Err(IsoError::MissingDensityField),
        };

        let geometry = self.config.geometry()?;
        let dims = geometry.dims();
        log::debug!(
            "regenerating: {} points per axis, spacing {}, iso_level {}, {:?}",
            dims.points_per_axis(),
            geometry.spacing(),
            self.config.iso_level,
            self.config.placement()
        );

        let mut buffers = TransientBuffers::allocate(dims, &self.tracker);
        self.lifecycle.advance(LifecycleState::Allocated)?;

        dispatch_sample(field, &geometry, &mut buffers.lattice)?;
        self.lifecycle.advance(LifecycleState::SampleDispatched)?;

        buffers.triangles.set_counter_value(0);
        let view = buffers.lattice.view()?;
        dispatch_triangulate(
            &view,
            self.config.iso_level,
            self.config.placement(),
            &buffers.triangles,
        );
        self.lifecycle.advance(LifecycleState::TriangulateDispatched)?;

        buffers.triangles.copy_count_to(&mut buffers.count);
        let count = buffers.count.get();
        log::debug!(
            "read back {} of {} triangle slots",
            count,
            buffers.triangles.capacity()
        );
        let triangles = buffers.triangles.read(count)?;
        self.lifecycle.advance(LifecycleState::ReadBack)?;

        let mesh = Mesh::from_triangles(&triangles);
        buffers.release();
        self.lifecycle.advance(LifecycleState::Released)?;

        Ok(mesh)
    }

    /// Sample the lattice and return its records without triangulating.
    ///
    /// A debugging aid: the lattice buffer is allocated, filled, read back and
    /// released within the call.
    pub fn sample_lattice(&self) -> Result<Vec<LatticeSample>> {
        let sphere = self.config.sphere();
        let field: &(dyn DensityField + Sync) = match &self.field {
            Some(FieldSource::Sphere) => &sphere,
            Some(FieldSource::Custom(field)) => &**field,
            None => return Err(IsoError::MissingDensityField),
        };

        let geometry = self.config.geometry()?;
        let _lease = BufferLease::acquire(&self.tracker, 1);
        let mut lattice = LatticeBuffer::allocate(geometry.dims());
        dispatch_sample(field, &geometry, &mut lattice)?;
        Ok(lattice.read_back())
    }

    /// Hand the current mesh to the renderer, and to the physics system when
    /// collision is enabled.
    ///
    /// Returns `false` when there is no mesh yet.
    pub fn publish(
        &self,
        renderer: &mut dyn MeshSink,
        collider: Option<&mut dyn CollisionSink>,
    ) -> bool {
        let Some(mesh) = &self.mesh else {
            return false;
        };

        renderer.present(mesh, self.config.material);
        if self.config.can_collide {
            if let Some(collider) = collider {
                collider.attach_convex(mesh);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::MaterialId;
    use isomesh_core::Point3;

    #[derive(Default)]
    struct Recorder {
        presented: Vec<(usize, Option<MaterialId>)>,
        colliders: usize,
    }

    impl MeshSink for Recorder {
        fn present(&mut self, mesh: &Mesh, material: Option<MaterialId>) {
            self.presented.push((mesh.triangle_count(), material));
        }
    }

    impl CollisionSink for Recorder {
        fn attach_convex(&mut self, _mesh: &Mesh) {
            self.colliders += 1;
        }
    }

    #[test]
    fn test_regenerate_sphere() {
        let mut generator = SurfaceGenerator::sphere(GeneratorConfig::default());
        let count = generator.regenerate().unwrap().triangle_count();

        assert!(count > 0);
        assert_eq!(generator.state(), LifecycleState::Idle);
        assert_eq!(generator.resources().outstanding(), 0);
        assert_eq!(generator.regenerations(), 1);
        assert_eq!(generator.mesh().map(Mesh::triangle_count), Some(count));
    }

    #[test]
    fn test_missing_field() {
        let mut generator = SurfaceGenerator::new(GeneratorConfig::default());
        assert!(matches!(
            generator.regenerate(),
            Err(IsoError::MissingDensityField)
        ));
        assert_eq!(generator.resources().total_allocated(), 0);
        assert_eq!(generator.state(), LifecycleState::Idle);
        assert!(generator.mesh().is_none());
    }

    #[test]
    fn test_invalid_config_allocates_nothing() {
        let mut generator = SurfaceGenerator::sphere(GeneratorConfig::default());
        generator.config_mut().points_per_axis = 1;

        assert!(generator.regenerate().is_err());
        assert_eq!(generator.resources().total_allocated(), 0);
    }

    #[test]
    fn test_error_keeps_previous_mesh() {
        let mut generator = SurfaceGenerator::sphere(GeneratorConfig::default());
        generator.regenerate().unwrap();

        generator.config_mut().bounds_size = -1.0;
        assert!(generator.regenerate().is_err());
        assert!(generator.mesh().is_some());
    }

    #[test]
    fn test_custom_field() {
        let plane = |p: Point3| p.y;
        let mut generator = SurfaceGenerator::with_field(GeneratorConfig::default(), plane);
        let mesh = generator.regenerate().unwrap();

        assert!(mesh.triangle_count() > 0);
        for v in &mesh.vertices {
            assert!(v.y.abs() <= 10.0 / 9.0);
        }
    }

    #[test]
    fn test_sample_lattice_readback() {
        let generator = SurfaceGenerator::sphere(GeneratorConfig::new(10.0, 5, 4.0));
        let samples = generator.sample_lattice().unwrap();

        assert_eq!(samples.len(), 125);
        // Center point of a 5-point lattice sits on the sphere center.
        let center = samples[2 + 2 * 5 + 2 * 25];
        assert_eq!(center.position, Point3::ZERO);
        assert_eq!(center.density, -4.0);
        assert_eq!(generator.resources().outstanding(), 0);
    }

    #[test]
    fn test_publish_respects_collision_flag() {
        let config = GeneratorConfig::default().with_material(MaterialId(3));
        let mut generator = SurfaceGenerator::sphere(config);

        let mut renderer = Recorder::default();
        let mut physics = Recorder::default();
        assert!(!generator.publish(&mut renderer, Some(&mut physics as &mut dyn CollisionSink)));

        generator.regenerate().unwrap();
        assert!(generator.publish(&mut renderer, Some(&mut physics as &mut dyn CollisionSink)));
        assert_eq!(renderer.presented.len(), 1);
        assert_eq!(renderer.presented[0].1, Some(MaterialId(3)));
        assert_eq!(physics.colliders, 0);

        generator.config_mut().can_collide = true;
        assert!(generator.publish(&mut renderer, Some(&mut physics as &mut dyn CollisionSink)));
        assert_eq!(physics.colliders, 1);
    }
}
