use std::fmt::{Debug, Display};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::ray::Ray;

pub trait HasAabb {
    fn aabb(&self) -> Aabb;
}

impl HasAabb for Aabb {
    fn aabb(&self) -> Aabb {
        *self
    }
}

/// Axis-aligned bounding box. Used for entity hitboxes, block collision shapes, and
/// projectile sweep volumes.
#[derive(Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::NULL
    }
}

impl Debug for Aabb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl Display for Aabb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.2}, {:.2}, {:.2}] -> [{:.2}, {:.2}, {:.2}]",
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z
        )
    }
}

impl From<(f32, f32, f32, f32, f32, f32)> for Aabb {
    fn from(value: (f32, f32, f32, f32, f32, f32)) -> Self {
        let (min_x, min_y, min_z, max_x, max_y, max_z) = value;
        Self::new(
            Vec3::new(min_x, min_y, min_z),
            Vec3::new(max_x, max_y, max_z),
        )
    }
}

impl Aabb {
    pub const EVERYTHING: Self = Self {
        min: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        max: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
    };
    pub const NULL: Self = Self {
        min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    #[must_use]
    pub fn new(min: impl Into<Vec3>, max: impl Into<Vec3>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Builds a standing-entity bounding box from feet position, half-width, and height.
    #[must_use]
    pub fn from_feet(feet: Vec3, half_width: f32, height: f32) -> Self {
        let min = Vec3::new(feet.x - half_width, feet.y, feet.z - half_width);
        let max = Vec3::new(feet.x + half_width, feet.y + height, feet.z + half_width);
        Self { min, max }
    }

    #[must_use]
    pub fn shrink(self, amount: f32) -> Self {
        self.expand(-amount)
    }

    #[must_use]
    pub fn expand(mut self, amount: f32) -> Self {
        self.min -= Vec3::splat(amount);
        self.max += Vec3::splat(amount);
        self
    }

    #[inline]
    #[must_use]
    pub fn move_by(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    #[must_use]
    pub fn overlap(a: &Self, b: &Self) -> Option<Self> {
        let min = a.min.max(b.min);
        let max = a.max.min(b.max);
        if min.cmplt(max).all() {
            Some(Self { min, max })
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub fn collides(&self, other: &Self) -> bool {
        (self.min.cmple(other.max) & self.max.cmpge(other.min)).all()
    }

    #[inline]
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    #[must_use]
    pub fn dist2(&self, point: Vec3) -> f64 {
        let point_d = point.as_dvec3();
        let min_d = self.min.as_dvec3();
        let max_d = self.max.as_dvec3();
        let clamped = point_d.clamp(min_d, max_d);
        (point_d - clamped).length_squared()
    }

    #[must_use]
    pub fn mid(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }

    #[inline]
    #[must_use]
    pub fn lens(&self) -> Vec3 {
        self.max - self.min
    }

    /// Ray-AABB slab test. Returns the entry distance `t` along the ray, or `None` if the ray
    /// misses. A ray already inside the box returns `t = 0`.
    #[inline]
    #[must_use]
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let origin = ray.origin();
        let dir = ray.direction();
        let inv_dir = ray.inv_direction();

        let mut t1 = (self.min - origin) * inv_dir;
        let mut t2 = (self.max - origin) * inv_dir;

        for axis in 0..3 {
            if dir[axis] == 0.0 {
                if !(self.min[axis] <= origin[axis] && origin[axis] <= self.max[axis]) {
                    return None;
                }
                t1[axis] = -f32::INFINITY;
                t2[axis] = f32::INFINITY;
            }
        }

        let t_min = t1.min(t2).max(Vec3::splat(0.0));
        let t_max = t1.max(t2);

        if t_min.max_element() <= t_max.min_element() {
            Some(t_min.max_element())
        } else {
            None
        }
    }

    pub fn containing<T: HasAabb>(input: &[T]) -> Self {
        let mut current_min = Vec3::splat(f32::INFINITY);
        let mut current_max = Vec3::splat(f32::NEG_INFINITY);

        for elem in input {
            let elem = elem.aabb();
            current_min = current_min.min(elem.min);
            current_max = current_max.max(elem.max);
        }

        Self {
            min: current_min,
            max: current_max,
        }
    }
}
