use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
    time::Duration,
};

use tracing::{debug, error, trace, warn};

use camprobe_iface::{Camera, FrameBuffer};

use crate::{FrameSlot, Result};

/// Longest pause after a failed capture before trying again.
const FAILURE_BACKOFF: Duration = Duration::from_millis(100);

/// Result of one [capture_tick].
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A frame was published to the slot.
    Captured,
    TimedOut,
    Failed(String),
}

/// Wait for one frame and publish it.
///
/// Failures are logged here and reported to the caller. They never leave
/// the camera in a state that prevents the next tick.
pub fn capture_tick<C: Camera + ?Sized>(
    cam: &mut C,
    timeout: Duration,
    slot: &FrameSlot<FrameBuffer>,
) -> TickOutcome {
    match cam.snap_single(timeout) {
        Ok(frame) => {
            trace!(
                "frame {} ({}x{})",
                frame.host_timing.fno,
                frame.width(),
                frame.height()
            );
            if slot.post(frame) {
                trace!("dropped frame not yet displayed");
            }
            TickOutcome::Captured
        }
        Err(camprobe_iface::Error::Timeout) => {
            warn!("no frame within {} ms", timeout.as_millis());
            TickOutcome::TimedOut
        }
        Err(e) => {
            error!("capturing frame failed: {e}");
            TickOutcome::Failed(e.to_string())
        }
    }
}

/// Runs [capture_tick] in a loop on a dedicated thread.
///
/// The thread owns the camera. Dropping the worker (or calling
/// [CaptureWorker::stop]) ends the loop, waits for the thread and stops
/// acquisition.
pub struct CaptureWorker {
    stop_requested: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl CaptureWorker {
    /// Start acquisition, if needed, and spawn the capture thread.
    ///
    /// `notify` is called after each published frame.
    pub fn spawn<C: Camera + 'static>(
        mut camera: C,
        slot: FrameSlot<FrameBuffer>,
        timeout: Duration,
        notify: Box<dyn Fn() + Send>,
    ) -> Result<Self> {
        if !camera.is_acquiring() {
            camera.acquisition_start()?;
        }

        let stop_requested = Arc::new(AtomicBool::new(false));
        let join_handle = {
            let stop_requested = stop_requested.clone();
            std::thread::Builder::new()
                .name("capture".to_string())
                .spawn(move || {
                    while !stop_requested.load(Ordering::SeqCst) {
                        match capture_tick(&mut camera, timeout, &slot) {
                            TickOutcome::Captured => notify(),
                            TickOutcome::TimedOut => {}
                            TickOutcome::Failed(_) => {
                                std::thread::sleep(timeout.min(FAILURE_BACKOFF))
                            }
                        }
                    }
                    if let Err(e) = camera.acquisition_stop() {
                        error!("stopping acquisition failed: {e}");
                    }
                    debug!("capture thread done");
                })?
        };

        Ok(Self {
            stop_requested,
            join_handle: Some(join_handle),
        })
    }

    /// Whether the capture thread is still running.
    pub fn is_running(&self) -> bool {
        self.join_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Ask the thread to finish and wait for it. Blocks at most about one
    /// snap timeout.
    pub fn stop(&mut self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        if let Some(join_handle) = self.join_handle.take() {
            if join_handle.join().is_err() {
                error!("capture thread panicked");
            }
        }
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
