use crate::session::error::Result;
use crate::session::types::{DepthBuffer, HighResFrame, InterfaceOrientation};

/// Completion callback for a high-resolution capture request.
///
/// Invoked exactly once per request, on the session's internal thread, with
/// either the captured frame or the reason no frame could be delivered.
pub type CaptureCallback = Box<dyn FnOnce(Result<HighResFrame>) + Send>;

/// Platform-agnostic AR session trait.
///
/// Models the slice of an AR framework this crate consumes: an on-demand
/// high-resolution capture, the continuously updated scene-depth buffer, and
/// the current interface orientation. Tracking configuration, plane
/// detection, and rendering stay with the platform layer.
pub trait ArSession: Send + Sync {
    /// Request one high-resolution color frame.
    ///
    /// Asynchronous: returns once the request is accepted and completes via
    /// `callback` later. At most one request should be outstanding at a
    /// time; the coordinator enforces that above this trait.
    fn request_high_res_capture(&self, callback: CaptureCallback);

    /// Scene-depth buffer of the session's *current* frame, if depth sensing
    /// is active.
    ///
    /// This is deliberately not tied to any capture request: the current
    /// frame advances continuously, so a depth buffer fetched here may be
    /// from a slightly later instant than a just-captured color frame.
    fn scene_depth(&self) -> Option<DepthBuffer>;

    /// Current interface orientation, `Unknown` when unavailable.
    fn interface_orientation(&self) -> InterfaceOrientation;
}
