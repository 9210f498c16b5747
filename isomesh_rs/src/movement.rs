//! Planar movement from two input axes.

use isomesh_core::Point3;

/// Raw readings of the horizontal and vertical input axes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisInput {
    /// Left/right axis, in `[-1, 1]`.
    pub horizontal: f32,
    /// Forward/back axis, in `[-1, 1]`.
    pub vertical: f32,
}

impl AxisInput {
    /// Create an input sample.
    pub const fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

/// Moves a body in the XZ plane at a fixed speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarMovement {
    /// Units per second at full deflection.
    pub speed: f32,
}

impl PlanarMovement {
    /// Create a controller with `speed`.
    pub const fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// Velocity for `input`: `(horizontal, 0, vertical) * speed`.
    ///
    /// Axis readings are clamped to `[-1, 1]`; diagonals are not normalized.
    pub fn velocity(&self, input: AxisInput) -> Point3 {
        Point3::new(
            input.horizontal.clamp(-1.0, 1.0),
            0.0,
            input.vertical.clamp(-1.0, 1.0),
        ) * self.speed
    }
}

impl Default for PlanarMovement {
    fn default() -> Self {
        Self::new(5.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity() {
        let movement = PlanarMovement::new(2.0);
        assert_eq!(movement.velocity(AxisInput::new(1.0, 0.0)), Point3::new(2.0, 0.0, 0.0));
        assert_eq!(movement.velocity(AxisInput::new(0.0, -1.0)), Point3::new(0.0, 0.0, -2.0));
        assert_eq!(movement.velocity(AxisInput::default()), Point3::ZERO);
    }

    #[test]
    fn test_diagonal_not_normalized() {
        let v = PlanarMovement::new(1.0).velocity(AxisInput::new(1.0, 1.0));
        assert_eq!(v, Point3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_axis_clamped() {
        let v = PlanarMovement::new(1.0).velocity(AxisInput::new(3.0, -7.0));
        assert_eq!(v, Point3::new(1.0, 0.0, -1.0));
    }
}
