//! Sphere Mesh Generation
//!
//! Regenerates a sphere mesh with both vertex placements, reports timings and
//! accuracy, hands the result to a console renderer and writes it as OBJ.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --release --bin sphere_mesh -- 48 output/sphere.obj
//! ```
//!
//! Arguments are optional: points per axis (default 32) and output path
//! (default `sphere.obj`).

use std::env;

use instant::Instant;

use isomesh_rs::{
    CollisionSink, GeneratorConfig, MaterialId, Mesh, MeshSink, MeshStats, Point3,
    SurfaceGenerator,
};

const BOUNDS: f32 = 10.0;
const RADIUS: f32 = 4.0;

/// Renderer stand-in printing what it receives.
struct ConsoleRenderer;

impl MeshSink for ConsoleRenderer {
    fn present(&mut self, mesh: &Mesh, material: Option<MaterialId>) {
        println!(
            "  Renderer:        {} triangles, material {:?}",
            mesh.triangle_count(),
            material
        );
    }
}

/// Physics stand-in printing collider attachments.
struct ConsolePhysics;

impl CollisionSink for ConsolePhysics {
    fn attach_convex(&mut self, mesh: &Mesh) {
        println!("  Physics:         convex collider, {} vertices", mesh.vertex_count());
    }
}

fn max_radial_error(mesh: &Mesh) -> f32 {
    mesh.vertices
        .iter()
        .map(|v| (v.distance(Point3::ZERO) - RADIUS).abs())
        .fold(0.0, f32::max)
}

fn print_stats(stats: &MeshStats) {
    println!("    Triangles:     {}", stats.triangle_count);
    println!(
        "    Surface area:  {:.4} (exact {:.4})",
        stats.surface_area,
        4.0 * std::f32::consts::PI * RADIUS * RADIUS
    );
    println!(
        "    Bounding box:  ({:.2}, {:.2}, {:.2}) → ({:.2}, {:.2}, {:.2})",
        stats.bbox_min.x,
        stats.bbox_min.y,
        stats.bbox_min.z,
        stats.bbox_max.x,
        stats.bbox_max.y,
        stats.bbox_max.z
    );
}

fn main() {
    env_logger::init();

    println!("═══════════════════════════════════════════════════════════════");
    println!("          isomesh Sphere Generation");
    println!("═══════════════════════════════════════════════════════════════");
    println!();

    let args: Vec<String> = env::args().collect();
    let points_per_axis = match args.get(1).map(|s| s.parse::<u32>()) {
        Some(Ok(n)) => n,
        Some(Err(e)) => {
            eprintln!("Invalid points per axis '{}': {}", args[1], e);
            eprintln!("Usage: {} [points_per_axis] [output.obj]", args[0]);
            std::process::exit(1);
        }
        None => 32,
    };
    let output_path = args.get(2).cloned().unwrap_or_else(|| "sphere.obj".to_string());

    let config = GeneratorConfig::new(BOUNDS, points_per_axis, RADIUS)
        .with_material(MaterialId(1))
        .with_collision(true);
    let spacing = BOUNDS / (config.points_per_axis - 1) as f32;

    println!("  Points per axis: {}", config.points_per_axis);
    println!("  Bounds size:     {}", config.bounds_size);
    println!("  Spacing:         {:.4}", spacing);
    println!("  Radius:          {}", config.radius);
    println!();

    // =========================================================================
    // Step 1: Midpoint Placement
    // =========================================================================
    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│ Step 1: Midpoint Placement                                  │");
    println!("└─────────────────────────────────────────────────────────────┘");

    let mut generator = SurfaceGenerator::sphere(config);
    let start = Instant::now();
    let midpoint_error = match generator.regenerate() {
        Ok(mesh) => {
            let elapsed = start.elapsed();
            print_stats(&mesh.stats());
            println!("    Time:          {:.3}s", elapsed.as_secs_f64());
            max_radial_error(mesh)
        }
        Err(e) => {
            eprintln!("Error generating mesh: {}", e);
            std::process::exit(1);
        }
    };
    println!("    Max error:     {:.4}", midpoint_error);
    println!();

    // =========================================================================
    // Step 2: Interpolated Placement
    // =========================================================================
    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│ Step 2: Interpolated Placement                              │");
    println!("└─────────────────────────────────────────────────────────────┘");

    generator.config_mut().interpolate = true;
    let start = Instant::now();
    let interpolated_error = match generator.regenerate() {
        Ok(mesh) => {
            let elapsed = start.elapsed();
            print_stats(&mesh.stats());
            println!("    Time:          {:.3}s", elapsed.as_secs_f64());
            max_radial_error(mesh)
        }
        Err(e) => {
            eprintln!("Error generating mesh: {}", e);
            std::process::exit(1);
        }
    };
    println!("    Max error:     {:.4}", interpolated_error);
    println!();

    // =========================================================================
    // Step 3: Publish
    // =========================================================================
    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│ Step 3: Publish                                             │");
    println!("└─────────────────────────────────────────────────────────────┘");

    generator.publish(&mut ConsoleRenderer, Some(&mut ConsolePhysics as &mut dyn CollisionSink));
    println!("  Live buffers:    {}", generator.resources().outstanding());
    println!();

    // =========================================================================
    // Step 4: Export to OBJ
    // =========================================================================
    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│ Step 4: Export to OBJ                                       │");
    println!("└─────────────────────────────────────────────────────────────┘");

    let Some(mesh) = generator.take_mesh() else {
        eprintln!("No mesh to export");
        std::process::exit(1);
    };
    let start = Instant::now();
    if let Err(e) = mesh.save_obj(&output_path) {
        eprintln!("Error writing output file: {}", e);
        std::process::exit(1);
    }
    println!("  Output file:     {}", output_path);
    println!("  Write time:      {:.3}s", start.elapsed().as_secs_f64());
    println!();

    println!("═══════════════════════════════════════════════════════════════");
    println!("  Interpolation reduced max error {:.4} → {:.4}", midpoint_error, interpolated_error);
    println!("═══════════════════════════════════════════════════════════════");
}
