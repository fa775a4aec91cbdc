// Air canvas: draw on the live camera feed with your index finger.
// • Index finger up (middle down): draw on the board.
// • Index + middle up, then drop the middle: click the button under your fingertip.
// • "Board" shows/hides the board; Colors / Pen Size open their panels;
//   Eraser toggles the eraser; Clear wipes the board. ESC quits.

mod app;
mod args;
mod camera;
mod canvas;
mod config;
mod detector;
mod draw;
mod error;
mod gesture;
mod hands;
mod menu;
mod palette;
mod types;

use anyhow::Context;
use app::AirCanvas;
use args::Args;
use camera::{CameraCapture, CaptureThread, FrameSource};
use clap::Parser;
use config::{AppConfig, DetectorKind};
use detector::{MediaPipeDetector, PointerHands};
use draw::{Drawer, draw_text_5x7};
use hands::HandDetector;
use std::time::{Duration, Instant};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list {
        let cameras = nokhwa::query(nokhwa::utils::ApiBackend::Auto).context("Query cameras")?;
        println!("{:<5} | {:<30}", "Index", "Name");
        println!("{}", "-".repeat(40));
        for cam in cameras {
            println!("{:<5} | {:<30}", cam.index(), cam.human_name());
        }
        return Ok(());
    }

    /* --- Config --- */
    let mut config = AppConfig::load(&args.config).context("Load config")?;
    args.apply(&mut config);

    /* --- Camera ---
       Background capture fills a single-slot mailbox; otherwise every tick blocks on a read. */
    let cam = &config.camera;
    let mut source: Box<dyn FrameSource> = if cam.background_capture {
        let capture = CaptureThread::spawn(cam.index, cam.width, cam.height, cam.fps).context("Start camera")?;
        log::info!("Waiting for camera to initialize...");
        camera::wait_until(
            || capture.slot().has_frame(),
            Duration::from_millis(cam.startup_timeout_ms),
            Duration::from_millis(cam.startup_poll_ms),
        )
        .context("Camera initialization")?;
        Box::new(capture)
    } else {
        Box::new(CameraCapture::new(cam.index, cam.width, cam.height, cam.fps).context("Open camera")?)
    };
    let (w, h) = source.resolution();

    /* --- Hand detector --- */
    let mut detector: Box<dyn HandDetector> = match config.detector.kind {
        DetectorKind::Mediapipe => {
            let d = &config.detector;
            Box::new(MediaPipeDetector::spawn(&d.python, &d.script, d.min_confidence).context("Start hand detector")?)
        }
        DetectorKind::Pointer => Box::new(PointerHands::new()),
    };
    log::info!("Hand detector: {}", detector.name());

    /* --- Window + engine --- */
    let mut drawer = Drawer::new("Air Canvas", w as usize, h as usize)?;
    let mut air = AirCanvas::new(w as usize, h as usize, &config);

    /* --- HUD / FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        // 1) Latest camera frame; none yet means skip this tick.
        let Some(mut frame) = source.next_frame() else {
            drawer.pump();
            continue;
        };
        if config.camera.mirror {
            frame.mirror_horizontal();
        }

        // 2) Hands. A failed detection is a frame without hands.
        detector.feed_pointer(drawer.pointer());
        let hands = detector.detect(&frame).unwrap_or_else(|e| {
            log::warn!("{e}");
            Vec::new()
        });

        // 3) Gestures, menu, board, overlays.
        air.process_frame(&mut frame, &hands);
        draw_text_5x7(&mut frame, 8, 8, &hud_fps_text, 0x00_FF_FF_FF);

        // 4) Present.
        drawer.present(&frame)?;

        // 5) FPS counter (log + HUD once per second)
        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let fps = frames_this_second as f32 / now.duration_since(last_fps_time).as_secs_f32();
            log::debug!("FPS: {:.1}", fps);
            hud_fps_text = format!("FPS: {:.1}", fps);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    log::info!("Exiting");
    Ok(())
}
