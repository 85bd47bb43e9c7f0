use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::capture::align;
use crate::capture::decode;
use crate::capture::error::{CaptureError, Result};
use crate::capture::orientation::Rotation;
use crate::capture::result::CaptureResult;
use crate::diagnostics::stats::{CaptureSnapshot, CaptureStats};
use crate::session::api::ArSession;
use crate::session::types::HighResFrame;

/// Channel type carrying the last published capture, or `None` before the
/// first one.
pub type CaptureReceiver = watch::Receiver<Option<Arc<CaptureResult>>>;

/// Drives one high-resolution capture at a time.
///
/// `request_capture` claims the single in-flight slot, hands the session's
/// completion callback to a worker thread via a one-element channel, and
/// returns immediately. The worker decodes the color frame, fetches and
/// decodes the session's current depth buffer, rotates it to the interface
/// orientation resolved at that moment, and publishes an immutable
/// `CaptureResult` on a watch channel. Failures abort the publish and leave
/// the previously published value untouched.
///
/// Known limitation: depth comes from the session's current frame, not the
/// captured one, so the two images can be a moment apart.
pub struct CaptureCoordinator {
    session: Arc<dyn ArSession>,
    in_flight: Arc<AtomicBool>,
    publisher: Arc<watch::Sender<Option<Arc<CaptureResult>>>>,
    stats: Arc<Mutex<CaptureStats>>,
}

/// Clears the in-flight flag when the worker exits, whatever the path.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl CaptureCoordinator {
    /// Create a coordinator for the given session. Nothing is published
    /// until the first successful capture.
    pub fn new<S: ArSession + 'static>(session: Arc<S>) -> Self {
        let (publisher, _) = watch::channel(None);
        Self {
            session,
            in_flight: Arc::new(AtomicBool::new(false)),
            publisher: Arc::new(publisher),
            stats: Arc::new(Mutex::new(CaptureStats::new())),
        }
    }

    /// Request one high-resolution capture.
    ///
    /// Returns `CaptureError::RequestPending` when a capture is already in
    /// flight; the session is not contacted in that case. On success the
    /// result arrives on the watch channel; on any capture failure nothing
    /// is published and the request slot is simply freed again.
    pub fn request_capture(&self) -> Result<()> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("capture request rejected: one already in flight");
            self.stats.lock().record_rejected();
            return Err(CaptureError::RequestPending);
        }

        let started = Instant::now();
        let (completion_tx, completion_rx) =
            mpsc::sync_channel::<crate::session::error::Result<HighResFrame>>(1);

        let worker = {
            let session = Arc::clone(&self.session);
            let publisher = Arc::clone(&self.publisher);
            let stats = Arc::clone(&self.stats);
            let guard = InFlightGuard(Arc::clone(&self.in_flight));

            std::thread::Builder::new()
                .name("hires-capture".to_string())
                .spawn(move || {
                    let _guard = guard;
                    Self::run_capture(&completion_rx, &session, &publisher, &stats, started);
                })
        };

        if let Err(e) = worker {
            self.in_flight.store(false, Ordering::SeqCst);
            return Err(CaptureError::Worker(e.to_string()));
        }

        self.stats.lock().record_requested();
        self.session
            .request_high_res_capture(Box::new(move |result| {
                // The worker may have died; an undeliverable completion is
                // indistinguishable from a dropped callback on its side.
                let _ = completion_tx.send(result);
            }));
        Ok(())
    }

    /// Subscribe to published captures. The receiver starts at the current
    /// value (`None` before the first publish).
    pub fn subscribe(&self) -> CaptureReceiver {
        self.publisher.subscribe()
    }

    /// Most recently published capture, if any.
    pub fn latest(&self) -> Option<Arc<CaptureResult>> {
        self.publisher.borrow().clone()
    }

    /// Whether no capture request is currently in flight.
    pub fn is_idle(&self) -> bool {
        !self.in_flight.load(Ordering::SeqCst)
    }

    /// Take a snapshot of capture stats.
    pub fn diagnostics(&self) -> CaptureSnapshot {
        self.stats.lock().snapshot()
    }

    /// Worker body: wait for the completion, decode, align, publish.
    fn run_capture(
        completion_rx: &mpsc::Receiver<crate::session::error::Result<HighResFrame>>,
        session: &Arc<dyn ArSession>,
        publisher: &watch::Sender<Option<Arc<CaptureResult>>>,
        stats: &Mutex<CaptureStats>,
        started: Instant,
    ) {
        let frame = match completion_rx.recv() {
            Ok(Ok(frame)) => frame,
            Ok(Err(e)) => {
                debug!("capture aborted, session delivered no frame: {e}");
                stats.lock().record_session_abort();
                return;
            }
            Err(_) => {
                debug!("capture aborted, session dropped the completion callback");
                stats.lock().record_session_abort();
                return;
            }
        };

        let color = match decode::decode_color(&frame.color) {
            Ok(image) => image,
            Err(e) => {
                debug!("capture aborted, color decode failed: {e}");
                stats.lock().record_color_decode_failure();
                return;
            }
        };

        // Depth rides along best-effort; a failure here only costs the
        // depth image, never the publish.
        let depth = match session.scene_depth() {
            Some(buffer) => match decode::decode_depth(&buffer) {
                Ok(image) => {
                    let rotation = Rotation::from_interface(session.interface_orientation());
                    Some(align::rotated(image, rotation))
                }
                Err(e) => {
                    warn!("depth decode failed, publishing color only: {e}");
                    stats.lock().record_depth_decode_failure();
                    None
                }
            },
            None => {
                stats.lock().record_depth_missing();
                None
            }
        };

        let result = CaptureResult::new(color, depth);
        let resolution = result.resolution_text();
        let has_depth = result.depth.is_some();
        publisher.send_replace(Some(Arc::new(result)));

        let latency = started.elapsed();
        stats.lock().record_published(latency);
        info!(
            "published {resolution} capture (depth: {}, {} ms)",
            if has_depth { "yes" } else { "no" },
            latency.as_millis()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::api::CaptureCallback;
    use crate::session::error::SessionError;
    use crate::session::simulated::SimulatedSession;
    use crate::session::types::{ColorBuffer, DepthBuffer, InterfaceOrientation};
    use image::Rgb;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Poll until `condition` holds or the deadline passes.
    fn wait_until(deadline_ms: u64, condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_millis(deadline_ms);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    fn wait_for_publish(coordinator: &CaptureCoordinator) -> Arc<CaptureResult> {
        assert!(
            wait_until(2000, || coordinator.is_idle() && coordinator.latest().is_some()),
            "capture never published"
        );
        coordinator.latest().unwrap()
    }

    /// Session that parks the completion callback until the test releases
    /// it, keeping the request in flight on demand.
    struct HeldSession {
        pending: Mutex<Option<CaptureCallback>>,
        requests: AtomicUsize,
        depth: Mutex<Option<DepthBuffer>>,
        orientation: InterfaceOrientation,
    }

    impl HeldSession {
        fn new() -> Self {
            Self {
                pending: Mutex::new(None),
                requests: AtomicUsize::new(0),
                depth: Mutex::new(None),
                orientation: InterfaceOrientation::Unknown,
            }
        }

        fn with_depth(self, depth: DepthBuffer) -> Self {
            *self.depth.lock() = Some(depth);
            self
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }

        /// Wait for a request to arrive, then complete it.
        fn complete(&self, result: crate::session::error::Result<HighResFrame>) {
            assert!(
                wait_until(2000, || self.pending.lock().is_some()),
                "no capture request arrived"
            );
            let callback = self.pending.lock().take().unwrap();
            callback(result);
        }

        /// Wait for a request, then drop its callback without completing.
        fn drop_callback(&self) {
            assert!(
                wait_until(2000, || self.pending.lock().is_some()),
                "no capture request arrived"
            );
            drop(self.pending.lock().take());
        }
    }

    impl ArSession for HeldSession {
        fn request_high_res_capture(&self, callback: CaptureCallback) {
            self.requests.fetch_add(1, Ordering::SeqCst);
            *self.pending.lock() = Some(callback);
        }

        fn scene_depth(&self) -> Option<DepthBuffer> {
            self.depth.lock().clone()
        }

        fn interface_orientation(&self) -> InterfaceOrientation {
            self.orientation
        }
    }

    /// Tiny gray frame (luma 77 throughout).
    fn small_frame() -> HighResFrame {
        HighResFrame {
            color: ColorBuffer {
                width: 4,
                height: 2,
                luma: vec![77; 8],
                chroma: vec![128; 4],
            },
            depth: None,
        }
    }

    #[test]
    fn successful_capture_publishes_color_and_depth() {
        let coordinator = CaptureCoordinator::new(Arc::new(SimulatedSession::new()));
        coordinator.request_capture().unwrap();

        let result = wait_for_publish(&coordinator);
        assert_eq!(result.width, 640);
        assert_eq!(result.height, 480);
        assert_eq!(result.resolution_text(), "640 × 480");
        assert!(result.depth.is_some());

        let snap = coordinator.diagnostics();
        assert_eq!(snap.requested, 1);
        assert_eq!(snap.published, 1);
    }

    #[test]
    fn session_failure_publishes_nothing() {
        let session = SimulatedSession::new()
            .with_capture_failure(SessionError::CaptureUnavailable("busy".to_string()));
        let coordinator = CaptureCoordinator::new(Arc::new(session));
        coordinator.request_capture().unwrap();

        assert!(wait_until(2000, || coordinator.is_idle()));
        assert!(coordinator.latest().is_none());
        assert_eq!(coordinator.diagnostics().session_aborts, 1);
    }

    #[test]
    fn failure_leaves_prior_publication_untouched() {
        let session = Arc::new(HeldSession::new());
        let coordinator = CaptureCoordinator::new(Arc::clone(&session));

        coordinator.request_capture().unwrap();
        session.complete(Ok(small_frame()));
        let first = wait_for_publish(&coordinator);

        coordinator.request_capture().unwrap();
        session.complete(Err(SessionError::Interrupted("gone".to_string())));
        assert!(wait_until(2000, || coordinator.is_idle()));

        let after = coordinator.latest().unwrap();
        assert!(Arc::ptr_eq(&first, &after), "failed capture replaced the published result");
        assert_eq!(coordinator.diagnostics().published, 1);
    }

    #[test]
    fn color_decode_failure_aborts_the_publish() {
        let session = Arc::new(HeldSession::new());
        let coordinator = CaptureCoordinator::new(Arc::clone(&session));

        coordinator.request_capture().unwrap();
        session.complete(Ok(HighResFrame {
            color: ColorBuffer {
                width: 4,
                height: 2,
                luma: vec![0; 3],
                chroma: vec![128; 4],
            },
            depth: None,
        }));

        assert!(wait_until(2000, || coordinator.is_idle()));
        assert!(coordinator.latest().is_none());
        assert_eq!(coordinator.diagnostics().color_decode_failures, 1);
    }

    #[test]
    fn missing_depth_degrades_to_color_only() {
        let session = SimulatedSession::new()
            .with_resolution(3840, 2160)
            .with_depth(false);
        let coordinator = CaptureCoordinator::new(Arc::new(session));
        coordinator.request_capture().unwrap();

        let result = wait_for_publish(&coordinator);
        assert!(result.depth.is_none());
        assert_eq!(result.resolution_text(), "3840 × 2160");
        assert_eq!(coordinator.diagnostics().depth_missing, 1);
    }

    #[test]
    fn depth_decode_failure_degrades_to_color_only() {
        let bad_depth = DepthBuffer {
            width: 8,
            height: 8,
            values: vec![1.0; 3],
        };
        let session = Arc::new(HeldSession::new().with_depth(bad_depth));
        let coordinator = CaptureCoordinator::new(Arc::clone(&session));

        coordinator.request_capture().unwrap();
        session.complete(Ok(small_frame()));

        let result = wait_for_publish(&coordinator);
        assert!(result.depth.is_none());
        assert_eq!(result.width, 4);
        assert_eq!(coordinator.diagnostics().depth_decode_failures, 1);
    }

    #[test]
    fn depth_is_rotated_to_the_current_orientation() {
        let session = SimulatedSession::new().with_orientation(InterfaceOrientation::Portrait);
        let coordinator = CaptureCoordinator::new(Arc::new(session));
        coordinator.request_capture().unwrap();

        let result = wait_for_publish(&coordinator);
        // Sensor depth is 256×192; a portrait quarter turn swaps the extent
        let depth = result.depth.as_ref().unwrap();
        assert_eq!(depth.dimensions(), (192, 256));
    }

    #[test]
    fn second_request_while_pending_is_rejected() {
        let session = Arc::new(HeldSession::new());
        let coordinator = CaptureCoordinator::new(Arc::clone(&session));

        coordinator.request_capture().unwrap();
        assert!(wait_until(2000, || session.requests() == 1));

        let second = coordinator.request_capture();
        assert_eq!(second.unwrap_err(), CaptureError::RequestPending);
        assert_eq!(session.requests(), 1, "rejected request reached the session");

        session.complete(Ok(small_frame()));
        let _ = wait_for_publish(&coordinator);
        assert_eq!(coordinator.diagnostics().rejected, 1);
    }

    #[test]
    fn slot_frees_after_completion_for_the_next_request() {
        let session = Arc::new(HeldSession::new());
        let coordinator = CaptureCoordinator::new(Arc::clone(&session));

        coordinator.request_capture().unwrap();
        session.complete(Ok(small_frame()));
        let _ = wait_for_publish(&coordinator);

        coordinator.request_capture().unwrap();
        session.complete(Ok(small_frame()));
        assert!(wait_until(2000, || coordinator.diagnostics().published == 2));
    }

    #[test]
    fn sequential_captures_publish_distinct_fully_formed_results() {
        let session = SimulatedSession::new().with_resolution(16, 16);
        let coordinator = CaptureCoordinator::new(Arc::new(session));

        coordinator.request_capture().unwrap();
        let first = wait_for_publish(&coordinator);

        coordinator.request_capture().unwrap();
        assert!(
            wait_until(2000, || coordinator.diagnostics().published == 2),
            "second capture never published"
        );
        let second = coordinator.latest().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        // The session bakes its sequence number into the luma plane, so the
        // two color images must differ pixel for pixel at (0,0)
        assert_eq!(*first.color.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*second.color.get_pixel(0, 0), Rgb([11, 11, 11]));
        assert!(first.depth.is_some());
        assert!(second.depth.is_some());
    }

    #[test]
    fn dropped_callback_counts_as_session_abort() {
        let session = Arc::new(HeldSession::new());
        let coordinator = CaptureCoordinator::new(Arc::clone(&session));

        coordinator.request_capture().unwrap();
        session.drop_callback();

        assert!(wait_until(2000, || coordinator.is_idle()));
        assert!(coordinator.latest().is_none());
        assert_eq!(coordinator.diagnostics().session_aborts, 1);
    }

    #[test]
    fn subscriber_sees_the_publication() {
        let coordinator = CaptureCoordinator::new(Arc::new(SimulatedSession::new()));
        let mut receiver = coordinator.subscribe();
        assert!(receiver.borrow().is_none());

        coordinator.request_capture().unwrap();
        let _ = wait_for_publish(&coordinator);

        assert!(receiver.has_changed().unwrap());
        let seen = receiver.borrow_and_update().clone().unwrap();
        assert_eq!(seen.width, 640);
    }

    #[test]
    fn coordinator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CaptureCoordinator>();
    }
}
