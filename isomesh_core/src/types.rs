//! Core types for isosurface extraction.
//!
//! Provides the 3D point type, lattice coordinates, the padded lattice sample
//! record and the triangle record emitted by the triangulator.

use core::ops::{Add, Div, Index, Mul, Neg, Sub};

/// Worst-case number of triangles a single marching-cubes cell can emit.
pub const MAX_TRIANGLES_PER_CELL: usize = 5;

/// A 3D point with named fields for clarity.
///
/// Provides arithmetic operations and conversions to/from arrays.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Point3 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Point3 {
    /// The origin.
    pub const ZERO: Self = Self::splat(0.0);

    /// Create a new Point3.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Create a Point3 with all components set to the same value.
    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    /// Convert to an array.
    #[inline]
    pub const fn as_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Linear interpolation between two points.
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// Dot product with another point (treating both as vectors).
    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product with another point (treating both as vectors).
    #[inline]
    pub fn cross(self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Squared length of the vector.
    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length (magnitude) of the vector.
    #[inline]
    pub fn length(self) -> f32 {
        libm::sqrtf(self.length_squared())
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Normalize the vector to unit length.
    /// Returns a zero vector if the length is zero.
    #[inline]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            Self::ZERO
        } else {
            self / len
        }
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self {
            x: if self.x < other.x { self.x } else { other.x },
            y: if self.y < other.y { self.y } else { other.y },
            z: if self.z < other.z { self.z } else { other.z },
        }
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self {
            x: if self.x > other.x { self.x } else { other.x },
            y: if self.y > other.y { self.y } else { other.y },
            z: if self.z > other.z { self.z } else { other.z },
        }
    }

    /// True when every component is finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f32; 3]> for Point3 {
    #[inline]
    fn from(arr: [f32; 3]) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
            z: arr[2],
        }
    }
}

impl From<Point3> for [f32; 3] {
    #[inline]
    fn from(p: Point3) -> Self {
        p.as_array()
    }
}

impl From<(f32, f32, f32)> for Point3 {
    #[inline]
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        Self { x, y, z }
    }
}

impl Add for Point3 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Point3 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Point3 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl Mul<Point3> for f32 {
    type Output = Point3;

    #[inline]
    fn mul(self, point: Point3) -> Point3 {
        point * self
    }
}

impl Div<f32> for Point3 {
    type Output = Self;

    #[inline]
    fn div(self, scalar: f32) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

impl Neg for Point3 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// Integer coordinate of a lattice point (or of a cell's minimum corner).
///
/// Each component lies in `[0, points_per_axis)` for points and in
/// `[0, points_per_axis - 1)` for cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LatticeCoord {
    /// X index.
    pub x: u32,
    /// Y index.
    pub y: u32,
    /// Z index.
    pub z: u32,
}

impl LatticeCoord {
    /// Create a new LatticeCoord.
    #[inline]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Convert to an array.
    #[inline]
    pub const fn as_array(&self) -> [u32; 3] {
        [self.x, self.y, self.z]
    }

    /// Offset by a corner offset (each component 0 or 1).
    #[inline]
    pub const fn offset(&self, corner: (u32, u32, u32)) -> Self {
        Self {
            x: self.x + corner.0,
            y: self.y + corner.1,
            z: self.z + corner.2,
        }
    }
}

impl From<[u32; 3]> for LatticeCoord {
    #[inline]
    fn from(arr: [u32; 3]) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
            z: arr[2],
        }
    }
}

/// One sampled lattice record: world position plus density.
///
/// Laid out as four floats so a lattice buffer has the same stride as a
/// `float4` compute buffer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct LatticeSample {
    /// World-space position of the lattice point.
    pub position: Point3,
    /// Density value at `position`.
    pub density: f32,
}

impl LatticeSample {
    /// Create a new sample.
    #[inline]
    pub const fn new(position: Point3, density: f32) -> Self {
        Self { position, density }
    }

    /// The record as `[x, y, z, density]`.
    #[inline]
    pub const fn as_array(&self) -> [f32; 4] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.density,
        ]
    }
}

/// A triangle emitted by the triangulator.
///
/// Corners are addressed by exact integer index: `0 -> a`, `1 -> b`, `2 -> c`.
/// Any other index is a programming error and panics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Triangle {
    /// First corner.
    pub a: Point3,
    /// Second corner.
    pub b: Point3,
    /// Third corner.
    pub c: Point3,
}

impl Triangle {
    /// Create a new triangle.
    #[inline]
    pub const fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self { a, b, c }
    }

    /// The corners in winding order.
    #[inline]
    pub const fn corners(&self) -> [Point3; 3] {
        [self.a, self.b, self.c]
    }

    /// Unnormalized face normal `(b - a) x (c - a)`.
    #[inline]
    pub fn cross(&self) -> Point3 {
        (self.b - self.a).cross(self.c - self.a)
    }

    /// Unit face normal following the winding order.
    /// Degenerate triangles yield the zero vector.
    #[inline]
    pub fn normal(&self) -> Point3 {
        self.cross().normalize()
    }

    /// Surface area.
    #[inline]
    pub fn area(&self) -> f32 {
        self.cross().length() * 0.5
    }
}

impl Index<usize> for Triangle {
    type Output = Point3;

    #[inline]
    fn index(&self, index: usize) -> &Point3 {
        match index {
            0 => &self.a,
            1 => &self.b,
            2 => &self.c,
            _ => panic!("triangle corner index {} out of range 0..3", index),
        }
    }
}

impl From<[Point3; 3]> for Triangle {
    #[inline]
    fn from([a, b, c]: [Point3; 3]) -> Self {
        Self { a, b, c }
    }
}
