// Camera access and frame delivery.
// `CameraCapture` opens the webcam and converts frames into 0x00RRGGBB buffers.
// `CaptureThread` runs that capture on a background thread and leaves the most
// recent frame in a single-slot mailbox for the main loop to pick up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::Error;
use crate::types::FrameBuffer;

// Bring in nokhwa types for camera control.
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
};

// `image` crate types for the decoded RGB frame.
use image::RgbImage;

/// Where the loop gets its next frame from.
pub trait FrameSource {
    /// The next frame to process, or None when nothing is available yet.
    fn next_frame(&mut self) -> Option<FrameBuffer>;

    /// Size of the frames this source delivers.
    fn resolution(&self) -> (u32, u32);
}

// A small wrapper around nokhwa::Camera so the rest of the code stays clean.
pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
}

impl CameraCapture {
    /// Open camera `index` at a target resolution (falls back to the closest match).
    pub fn new(index: u32, width: u32, height: u32, fps: u32) -> Result<Self, Error> {
        let idx = CameraIndex::Index(index);

        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            fps,
        );
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(idx, req).map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;
        cam.open_stream().map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        // The actual stream might choose a slightly different resolution.
        let actual = cam.resolution();
        log::info!("Opened camera {index}: {} at {}x{}", cam.info().human_name(), actual.width(), actual.height());

        Ok(Self { cam, width: actual.width(), height: actual.height() })
    }

    /// Grab one frame (blocks until the camera has one) and convert it to 0x00RRGGBB.
    pub fn grab(&mut self) -> Result<FrameBuffer, Error> {
        let frame = self.cam.frame().map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;
        let rgb: RgbImage = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;
        Ok(rgb_to_frame(&rgb))
    }
}

impl FrameSource for CameraCapture {
    /// Immediate single-shot read; a failed grab just means no frame this tick.
    fn next_frame(&mut self) -> Option<FrameBuffer> {
        self.grab().map_err(|e| log::warn!("{e}")).ok()
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        if let Err(e) = self.cam.stop_stream() {
            log::warn!("Stopping camera stream: {e}");
        }
    }
}

/// Pack an RGB image into 0x00RRGGBB pixels.
pub fn rgb_to_frame(rgb: &RgbImage) -> FrameBuffer {
    let (w, h) = rgb.dimensions();
    let pixels = rgb
        .pixels()
        .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
        .collect();
    FrameBuffer { width: w as usize, height: h as usize, pixels }
}

/// Single-slot mailbox: the capture thread overwrites, the loop reads the latest.
#[derive(Default)]
pub struct FrameSlot {
    latest: Mutex<Option<FrameBuffer>>,
}

impl FrameSlot {
    pub fn publish(&self, frame: FrameBuffer) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);
    }

    /// Copy of the most recent frame, if one has arrived.
    pub fn latest(&self) -> Option<FrameBuffer> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn has_frame(&self) -> bool {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

/// Pause after a failed grab before trying again.
const RETRY_PAUSE: Duration = Duration::from_millis(50);
/// How long `stop` waits for the thread before leaving it behind.
const STOP_GRACE: Duration = Duration::from_millis(500);

/// Background capture. The camera is opened on the capture thread itself and
/// open errors are handed back to `spawn`.
pub struct CaptureThread {
    slot: Arc<FrameSlot>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    width: u32,
    height: u32,
}

impl CaptureThread {
    pub fn spawn(index: u32, width: u32, height: u32, fps: u32) -> Result<Self, Error> {
        Self::start(move || CameraCapture::new(index, width, height, fps))
    }

    /// Run `open` on a new thread, then keep publishing whatever the source yields.
    /// The source is created on the thread, so it need not be `Send`.
    fn start<S, F>(open: F) -> Result<Self, Error>
    where
        S: FrameSource + 'static,
        F: FnOnce() -> Result<S, Error> + Send + 'static,
    {
        let slot = Arc::new(FrameSlot::default());
        let running = Arc::new(AtomicBool::new(true));
        let (opened_tx, opened_rx) = mpsc::sync_channel::<Result<(u32, u32), Error>>(1);

        let handle = {
            let slot = Arc::clone(&slot);
            let running = Arc::clone(&running);
            thread::Builder::new().name("camera-capture".into()).spawn(move || {
                let mut source = match open() {
                    Ok(source) => {
                        let _ = opened_tx.send(Ok(source.resolution()));
                        source
                    }
                    Err(e) => {
                        let _ = opened_tx.send(Err(e));
                        return;
                    }
                };
                while running.load(Ordering::Relaxed) {
                    match source.next_frame() {
                        Some(frame) => slot.publish(frame),
                        None => thread::sleep(RETRY_PAUSE),
                    }
                }
                log::debug!("capture thread exiting");
            })?
        };

        let opened = opened_rx
            .recv()
            .map_err(|_| Error::CameraInit("capture thread exited before opening the camera".into()))?;
        let (width, height) = match opened {
            Ok(res) => res,
            Err(e) => {
                let _ = handle.join();
                return Err(e);
            }
        };

        Ok(Self { slot, running, handle: Some(handle), width, height })
    }

    pub fn slot(&self) -> &FrameSlot {
        &self.slot
    }

    /// Stop the thread and release the camera. Safe to call twice.
    /// A thread stuck inside a blocking read is detached after `STOP_GRACE`.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        let Some(handle) = self.handle.take() else {
            return;
        };
        if wait_until(|| handle.is_finished(), STOP_GRACE, Duration::from_millis(5)).is_err() {
            log::warn!("capture thread did not stop within {} ms; detaching it", STOP_GRACE.as_millis());
            return;
        }
        if handle.join().is_err() {
            log::warn!("capture thread panicked");
        }
        log::info!("Camera released");
    }
}

impl FrameSource for CaptureThread {
    fn next_frame(&mut self) -> Option<FrameBuffer> {
        self.slot.latest()
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for CaptureThread {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Poll `ready` every `poll` until it returns true or `timeout` passes.
pub fn wait_until(mut ready: impl FnMut() -> bool, timeout: Duration, poll: Duration) -> Result<(), Error> {
    let start = Instant::now();
    loop {
        if ready() {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(Error::CameraTimeout(timeout.as_millis() as u64));
        }
        thread::sleep(poll);
    }
}
