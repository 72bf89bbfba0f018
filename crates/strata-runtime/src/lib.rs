//! Strata Runtime - Per-frame state for the demo driver
//!
//! Provides the frame loop building blocks:
//! - `FrameClock` — delta time and periodic average-FPS reports
//! - `InputState` — buffered camera events and held movement keys
//! - `FreeCamera` — mouse-look free-fly camera producing view/projection matrices

mod camera;
mod clock;
mod input;

pub use camera::{CameraFrame, FreeCamera};
pub use clock::{FpsReport, FrameClock};
pub use input::{CameraEvent, InputState, MoveKeys};
