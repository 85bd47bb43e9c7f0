// High-resolution AR frame capture — session boundary, decode pipeline, publishing.

pub mod capture;
pub mod config;
pub mod diagnostics;
pub mod session;

pub use capture::coordinator::{CaptureCoordinator, CaptureReceiver};
pub use capture::result::{CaptureInfo, CaptureResult};
pub use session::api::{ArSession, CaptureCallback};
pub use session::simulated::SimulatedSession;
pub use session::types::{ColorBuffer, DepthBuffer, HighResFrame, InterfaceOrientation};
