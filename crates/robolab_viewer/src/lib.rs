//! Robolab Viewer
//!
//! Real-time robot scene controller: a procedurally animated character rig,
//! attachable accessories, a projectile mini-game, and hover/click picking,
//! driven by one fixed-order update per frame.
//!
//! # Features
//!
//! - **Rig**: typed part table over a retained scene graph
//! - **Locomotion**: damped velocity, play-area clamping, walk cycle
//! - **Poses and gestures**: explicit rotation targets, wave, salute
//! - **Accessories**: wings, boosters, and shield with blended effects
//! - **Mini-game**: spawn, flight, contact, click interception, lives
//! - **Host interface**: command queue in, notification bus out
//!
//! # Example
//!
//! ```rust
//! use robolab_viewer::{Command, CameraView, RobotViewer, ViewerConfig};
//! use robolab_platform::Viewport;
//!
//! let mut viewer = RobotViewer::headless(ViewerConfig::default()).unwrap();
//! viewer.mount(Viewport::new(960.0, 520.0).unwrap()).unwrap();
//! viewer.dispatch(Command::SetView(CameraView::Top));
//! viewer.frame(0.0).unwrap();
//! viewer.frame(1.0 / 60.0).unwrap();
//! viewer.unmount();
//! ```

pub mod accessory;
pub mod command;
pub mod config;
pub mod error;
pub mod game;
pub mod gesture;
pub mod highlight;
pub mod idle;
pub mod input;
pub mod locomotion;
pub mod notify;
pub mod rig;
pub mod targets;
pub mod viewer;
pub mod views;

#[cfg(test)]
mod tests;

pub use command::{
    Accessory, CameraView, Command, Direction, GameAction, MoveState, PoseName, WalkPattern,
};
pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
pub use game::GamePhase;
pub use notify::Notification;
pub use rig::Part;
pub use targets::{RotationTargets, TargetSource};
pub use viewer::{ListenerKind, RobotViewer};
