//! Bounding volumes and rays for picking and contact tests

use crate::math::Vec3;

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    /// Create an empty bounding box
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Create from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create from center and half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Check if the bounding box is empty
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Get the center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size (width, height, depth)
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Check if a point is inside
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

/// Bounding sphere
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.center.distance(point) <= self.radius
    }
}

/// Ray for picking
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Ray origin
    pub origin: Vec3,
    /// Ray direction (normalized by the constructors)
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray, normalizing the direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = direction.normalize();
        let direction = if direction == Vec3::ZERO {
            Vec3::FORWARD
        } else {
            direction
        };
        Self { origin, direction }
    }

    /// Create a ray from two points
    pub fn from_points(from: Vec3, to: Vec3) -> Self {
        Self::new(from, to - from)
    }

    /// Get point along ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the entry point of a box (slab test)
    ///
    /// The direction does not have to be unit length, which lets callers
    /// transform a world ray into a node's local space and keep the
    /// parameter comparable across nodes.
    pub fn intersect_box(&self, bbox: &BoundingBox) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        let o = self.origin.to_array();
        let d = self.direction.to_array();
        let lo = bbox.min.to_array();
        let hi = bbox.max.to_array();

        for axis in 0..3 {
            if d[axis].abs() < 1e-8 {
                if o[axis] < lo[axis] || o[axis] > hi[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d[axis];
            let mut t0 = (lo[axis] - o[axis]) * inv;
            let mut t1 = (hi[axis] - o[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            None
        } else {
            Some(t_min.max(0.0))
        }
    }

    /// Distance along the ray to the first intersection with a sphere
    pub fn intersect_sphere(&self, sphere: &BoundingSphere) -> Option<f32> {
        let oc = self.origin - sphere.center;
        let a = self.direction.length_squared();
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - sphere.radius * sphere.radius;
        let disc = b * b - a * c;
        if disc < 0.0 || a <= 0.0 {
            return None;
        }
        let sqrt_disc = disc.sqrt();
        let near = (-b - sqrt_disc) / a;
        let far = (-b + sqrt_disc) / a;
        if far < 0.0 {
            None
        } else {
            Some(near.max(0.0))
        }
    }
}
