use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// A three-component vector of `f64`s.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3d {
    pub const ZERO: Vector3d = Vector3d::splat(0.0);
    pub const ONE: Vector3d = Vector3d::splat(1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f64) -> Self {
        Self { x: v, y: v, z: v }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Component-wise product, used to apply velocity modifiers.
impl Mul for Vector3d {
    type Output = Vector3d;

    fn mul(self, rhs: Vector3d) -> Vector3d {
        Vector3d::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

impl Mul<f64> for Vector3d {
    type Output = Vector3d;

    fn mul(self, rhs: f64) -> Vector3d {
        Vector3d::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_scales_each_axis() {
        let velocity = Vector3d::new(1.0, -2.0, 4.0);
        let modifier = Vector3d::new(0.5, 1.0, 0.25);
        assert_eq!(velocity * modifier, Vector3d::new(0.5, -2.0, 1.0));
        assert_eq!(velocity * 2.0, Vector3d::new(2.0, -4.0, 8.0));
    }

    #[test]
    fn nan_is_not_finite() {
        assert!(Vector3d::ONE.is_finite());
        assert!(!Vector3d::new(0.0, f64::NAN, 0.0).is_finite());
        assert!(!Vector3d::new(f64::INFINITY, 0.0, 0.0).is_finite());
    }
}
