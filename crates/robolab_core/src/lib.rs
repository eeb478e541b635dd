//! Robolab Core
//!
//! Foundational primitives shared by every Robolab crate:
//!
//! - **Math**: vectors, XYZ Euler rotations, column-major matrices, colors
//! - **Bounds**: boxes, spheres, and rays for picking and contact tests
//! - **Events**: command queue, notification bus, and listener registry
//!   used instead of global event dispatch

pub mod bounds;
pub mod events;
pub mod math;

pub use bounds::{BoundingBox, BoundingSphere, Ray};
pub use events::{
    CommandQueue, CommandSender, ListenerId, ListenerRegistry, NotificationBus,
    SubscriptionHandle,
};
pub use math::{Color, Euler, Mat4, Vec2, Vec3};
