//! Simulated AR session for demos and tests without platform hardware.
//!
//! Produces deterministic synthetic frames: a gradient color image with the
//! capture sequence number mixed into the luma plane (so consecutive
//! captures are distinguishable), and an optional radial scene-depth field.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::session::api::{ArSession, CaptureCallback};
use crate::session::error::SessionError;
use crate::session::types::{ColorBuffer, DepthBuffer, HighResFrame, InterfaceOrientation};

const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;

/// Depth sensors report at a fixed low resolution regardless of the color
/// frame size; 256×192 matches LiDAR-class hardware.
const DEPTH_WIDTH: u32 = 256;
const DEPTH_HEIGHT: u32 = 192;

#[derive(Debug)]
struct SimulatedState {
    width: u32,
    height: u32,
    orientation: InterfaceOrientation,
    depth_enabled: bool,
    capture_failure: Option<SessionError>,
}

/// A fake AR session producing synthetic frames.
///
/// Capture requests complete synchronously on the caller's thread; the real
/// platform calls back from its own queue, but consumers are expected to hop
/// to their own worker anyway, so the difference is not observable through
/// the trait.
pub struct SimulatedSession {
    state: Mutex<SimulatedState>,
    captures: AtomicU64,
}

impl SimulatedSession {
    /// Create a session producing 640×480 frames with depth enabled.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimulatedState {
                width: DEFAULT_WIDTH,
                height: DEFAULT_HEIGHT,
                orientation: InterfaceOrientation::default(),
                depth_enabled: true,
                capture_failure: None,
            }),
            captures: AtomicU64::new(0),
        }
    }

    /// Set the color frame resolution.
    pub fn with_resolution(self, width: u32, height: u32) -> Self {
        let mut state = self.state.lock();
        state.width = width;
        state.height = height;
        drop(state);
        self
    }

    /// Set the reported interface orientation.
    pub fn with_orientation(self, orientation: InterfaceOrientation) -> Self {
        self.state.lock().orientation = orientation;
        self
    }

    /// Enable or disable the synthetic depth field.
    pub fn with_depth(self, enabled: bool) -> Self {
        self.state.lock().depth_enabled = enabled;
        self
    }

    /// Inject a failure for the next capture request only.
    pub fn with_capture_failure(self, error: SessionError) -> Self {
        self.state.lock().capture_failure = Some(error);
        self
    }

    /// Change the reported orientation of a running session.
    pub fn set_orientation(&self, orientation: InterfaceOrientation) {
        self.state.lock().orientation = orientation;
    }

    /// Number of frames the session has delivered so far.
    pub fn captures_delivered(&self) -> u64 {
        self.captures.load(Ordering::SeqCst)
    }

    /// Gradient luma with the sequence number mixed in; chroma stays neutral
    /// so decoded pixels come out as pure gray levels.
    fn synth_color(width: u32, height: u32, seq: u64) -> ColorBuffer {
        let offset = (seq.wrapping_mul(11) & 0xFF) as usize;
        let mut luma = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height as usize {
            for x in 0..width as usize {
                luma.push(((x * 2 + y * 3 + offset) % 256) as u8);
            }
        }

        let chroma_len = (width.div_ceil(2) * height.div_ceil(2) * 2) as usize;
        ColorBuffer {
            width,
            height,
            luma,
            chroma: vec![128; chroma_len],
        }
    }

    /// Radial depth field: half a metre at the centre, four metres at the
    /// corners.
    fn synth_depth() -> DepthBuffer {
        let cx = f64::from(DEPTH_WIDTH - 1) / 2.0;
        let cy = f64::from(DEPTH_HEIGHT - 1) / 2.0;
        let max_r = cx.hypot(cy);

        let mut values = Vec::with_capacity((DEPTH_WIDTH * DEPTH_HEIGHT) as usize);
        for y in 0..DEPTH_HEIGHT {
            for x in 0..DEPTH_WIDTH {
                let r = (f64::from(x) - cx).hypot(f64::from(y) - cy) / max_r;
                values.push((0.5 + r * 3.5) as f32);
            }
        }
        DepthBuffer {
            width: DEPTH_WIDTH,
            height: DEPTH_HEIGHT,
            values,
        }
    }
}

impl Default for SimulatedSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ArSession for SimulatedSession {
    fn request_high_res_capture(&self, callback: CaptureCallback) {
        let (width, height, failure) = {
            let mut state = self.state.lock();
            (state.width, state.height, state.capture_failure.take())
        };

        if let Some(error) = failure {
            callback(Err(error));
            return;
        }

        let seq = self.captures.fetch_add(1, Ordering::SeqCst);
        callback(Ok(HighResFrame {
            color: Self::synth_color(width, height, seq),
            depth: None,
        }));
    }

    fn scene_depth(&self) -> Option<DepthBuffer> {
        if self.state.lock().depth_enabled {
            Some(Self::synth_depth())
        } else {
            None
        }
    }

    fn interface_orientation(&self) -> InterfaceOrientation {
        self.state.lock().orientation
    }
}
