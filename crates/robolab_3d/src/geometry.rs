//! Primitive geometry descriptors
//!
//! Geometry is described parametrically; vertex generation belongs to a GPU
//! backend. Each primitive knows its local bounding box, which is all the
//! picking pipeline needs.

use robolab_core::{BoundingBox, Vec3};

/// Parametric primitive shapes, centered on the local origin
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
    },
    /// Cylinder along the local Y axis
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
    },
    /// Cone along the local Y axis, apex at +Y
    Cone {
        radius: f32,
        height: f32,
    },
    /// Torus in the local XY plane
    Torus {
        radius: f32,
        tube: f32,
    },
    /// Flat plane in the local XY plane
    Plane {
        width: f32,
        height: f32,
    },
    /// Line grid on the XZ plane
    Grid {
        size: f32,
        divisions: u32,
    },
}

impl Geometry {
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Geometry::Box {
            width,
            height,
            depth,
        }
    }

    pub fn sphere(radius: f32) -> Self {
        Geometry::Sphere { radius }
    }

    pub fn cylinder(radius: f32, height: f32) -> Self {
        Geometry::Cylinder {
            radius_top: radius,
            radius_bottom: radius,
            height,
        }
    }

    /// Short name for debugging and frame dumps
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Box { .. } => "box",
            Geometry::Sphere { .. } => "sphere",
            Geometry::Cylinder { .. } => "cylinder",
            Geometry::Cone { .. } => "cone",
            Geometry::Torus { .. } => "torus",
            Geometry::Plane { .. } => "plane",
            Geometry::Grid { .. } => "grid",
        }
    }

    /// Whether the primitive can be hit by picking rays
    ///
    /// Grids are drawn as lines and never pickable.
    pub fn is_pickable(&self) -> bool {
        !matches!(self, Geometry::Grid { .. })
    }

    /// Axis-aligned bounds in local space
    pub fn local_bounds(&self) -> BoundingBox {
        let half = match *self {
            Geometry::Box {
                width,
                height,
                depth,
            } => Vec3::new(width, height, depth) * 0.5,
            Geometry::Sphere { radius } => Vec3::splat(radius),
            Geometry::Cylinder {
                radius_top,
                radius_bottom,
                height,
            } => {
                let r = radius_top.max(radius_bottom);
                Vec3::new(r, height * 0.5, r)
            }
            Geometry::Cone { radius, height } => Vec3::new(radius, height * 0.5, radius),
            Geometry::Torus { radius, tube } => {
                let r = radius + tube;
                Vec3::new(r, r, tube)
            }
            Geometry::Plane { width, height } => Vec3::new(width * 0.5, height * 0.5, 0.0),
            Geometry::Grid { size, .. } => Vec3::new(size * 0.5, 0.0, size * 0.5),
        };
        BoundingBox::from_center_half_extents(Vec3::ZERO, half)
    }
}
