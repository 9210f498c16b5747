//! Property-based tests over random generator configurations.

use isomesh_rs::{
    GeneratorConfig, IsoError, Point3, SurfaceGenerator, MAX_POINTS_PER_AXIS, MIN_POINTS_PER_AXIS,
};
use proptest::prelude::*;

fn arb_point() -> impl Strategy<Value = Point3> {
    (-3.0f32..3.0, -3.0f32..3.0, -3.0f32..3.0).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

fn arb_config() -> impl Strategy<Value = GeneratorConfig> {
    (
        2u32..24,
        1.0f32..20.0,
        0.1f32..8.0,
        arb_point(),
        -0.5f32..0.5,
        any::<bool>(),
    )
        .prop_map(|(n, bounds, radius, offset, iso, interpolate)| {
            GeneratorConfig::new(bounds, n, radius)
                .with_offset(offset)
                .with_iso_level(iso)
                .with_interpolation(interpolate)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Triangle count stays within the `5 (N-1)³` capacity.
    #[test]
    fn prop_triangle_count_within_capacity(config in arb_config()) {
        let n = config.points_per_axis as usize;
        let mut generator = SurfaceGenerator::sphere(config);
        let mesh = generator.regenerate().unwrap();

        prop_assert!(mesh.triangle_count() <= (n - 1).pow(3) * 5);
        prop_assert_eq!(mesh.vertex_count(), mesh.triangle_count() * 3);
        prop_assert_eq!(mesh.normals.len(), mesh.vertex_count());
        prop_assert_eq!(generator.resources().outstanding(), 0);
    }

    /// Every vertex lies inside the sampled cube.
    #[test]
    fn prop_vertices_within_bounds(config in arb_config()) {
        let geometry = config.geometry().unwrap();
        let (lo, hi) = (geometry.min_corner(), geometry.max_corner());
        let eps = 1e-3;

        let mut generator = SurfaceGenerator::sphere(config);
        let mesh = generator.regenerate().unwrap();

        for v in &mesh.vertices {
            prop_assert!(v.x >= lo.x - eps && v.x <= hi.x + eps);
            prop_assert!(v.y >= lo.y - eps && v.y <= hi.y + eps);
            prop_assert!(v.z >= lo.z - eps && v.z <= hi.z + eps);
        }
    }

    /// Normals are unit length or zero for degenerate triangles.
    #[test]
    fn prop_normals_unit_or_zero(config in arb_config()) {
        let mut generator = SurfaceGenerator::sphere(config);
        let mesh = generator.regenerate().unwrap();

        for n in &mesh.normals {
            let len = n.length();
            prop_assert!(len == 0.0 || (len - 1.0).abs() < 1e-4, "normal length {}", len);
        }
    }

    /// Lattice records sit at their flat index and hold the sphere distance.
    #[test]
    fn prop_lattice_readback_matches_field(config in arb_config()) {
        let geometry = config.geometry().unwrap();
        let dims = geometry.dims();
        let sphere = config.sphere();
        let generator = SurfaceGenerator::sphere(config);

        let samples = generator.sample_lattice().unwrap();
        prop_assert_eq!(samples.len(), dims.num_points());

        for (i, s) in samples.iter().enumerate() {
            prop_assert_eq!(s.position, geometry.position(dims.coord(i)));
            let expected = s.position.distance(sphere.center) - sphere.radius;
            prop_assert!((s.density - expected).abs() < 1e-4);
        }
    }

    /// The builder clamps resolution into the accepted range.
    #[test]
    fn prop_points_per_axis_clamped(n in any::<u32>()) {
        let config = GeneratorConfig::default().with_points_per_axis(n);
        prop_assert!(config.points_per_axis >= MIN_POINTS_PER_AXIS);
        prop_assert!(config.points_per_axis <= MAX_POINTS_PER_AXIS);
        prop_assert!(config.validate().is_ok());
    }

    /// Raw out-of-range resolutions are rejected, never clamped silently.
    #[test]
    fn prop_raw_resolution_validated(n in prop_oneof![0u32..2, 101u32..10_000]) {
        let mut config = GeneratorConfig::default();
        config.points_per_axis = n;
        let is_invalid = matches!(config.validate(), Err(IsoError::InvalidConfig { .. }));
        prop_assert!(is_invalid);
    }
}
