//! Camera controls

mod orbit;

pub use orbit::{OrbitController, OrbitInput, OrbitPose};
