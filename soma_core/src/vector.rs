//! Minimal 3-D vector in sensor coordinates (millimetres, millimetres per
//! second, or unit length for directions).

use std::ops::{Add, Sub};

/// A 3-D vector.  `y` is height above the sensor, `z` is depth toward the
/// user.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }

    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance_to(&self, other: Vec3) -> f32 {
        (*self - other).magnitude()
    }

    /// Unit vector in the same direction, or [`Vec3::ZERO`] for a zero-length
    /// input.
    pub fn normalized(&self) -> Vec3 {
        let m = self.magnitude();
        if m <= f32::EPSILON {
            return Vec3::ZERO;
        }
        Vec3::new(self.x / m, self.y / m, self.z / m)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}
