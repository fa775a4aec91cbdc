// Hand detectors.
// • MediaPipeDetector runs MediaPipe Hands in a Python helper process and
//   talks to it over stdin/stdout.
// • PointerHands fakes a hand from the window pointer, handy without a
//   model or for trying the menu out.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::Deserialize;

use crate::error::Error;
use crate::hands::{Finger, HandDetector, HandLandmarks, LANDMARK_COUNT, Landmark, PointerSample, landmarks};
use crate::palette::unpack;
use crate::types::FrameBuffer;

/* ---------- MediaPipe helper process ---------- */

// z is sent too; serde skips it.
#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f32,
    y: f32,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    handedness: String,
    score: f32,
    landmarks: Vec<LandmarkJson>,
}

#[derive(Deserialize, Debug)]
struct DetectionResult {
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Parse one response line. Hands under `min_confidence` or without the full
/// landmark set are dropped; the helper's order is kept.
pub fn parse_detection(line: &str, min_confidence: f32) -> Result<Vec<HandLandmarks>, Error> {
    let result: DetectionResult = serde_json::from_str(line.trim())
        .map_err(|e| Error::Detector(format!("bad response {:?}: {e}", line.trim())))?;

    if let Some(error) = result.error {
        return Err(Error::Detector(format!("helper reported: {error}")));
    }

    let mut hands = Vec::with_capacity(result.hands.len());
    for hand in result.hands {
        if hand.score < min_confidence {
            continue;
        }
        if hand.landmarks.len() != LANDMARK_COUNT {
            log::warn!("Expected {LANDMARK_COUNT} landmarks, got {}", hand.landmarks.len());
            continue;
        }
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        for (dst, lm) in points.iter_mut().zip(&hand.landmarks) {
            *dst = Landmark::new(lm.x, lm.y);
        }
        hands.push(HandLandmarks { points, handedness: hand.handedness });
    }
    Ok(hands)
}

/// Request header + RGB bytes for one frame: width, height, channels as u32 LE.
pub fn encode_frame(frame: &FrameBuffer, out: &mut Vec<u8>) {
    out.clear();
    out.reserve(12 + frame.pixels.len() * 3);
    out.extend_from_slice(&(frame.width as u32).to_le_bytes());
    out.extend_from_slice(&(frame.height as u32).to_le_bytes());
    out.extend_from_slice(&3u32.to_le_bytes());
    for &px in &frame.pixels {
        out.extend_from_slice(&unpack(px));
    }
}

pub struct MediaPipeDetector {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    min_confidence: f32,
    request: Vec<u8>, // reused per frame
}

impl MediaPipeDetector {
    /// Start `python script` and wait for it to print READY.
    pub fn spawn(python: &str, script: &str, min_confidence: f32) -> Result<Self, Error> {
        log::info!("Starting MediaPipe hand detector: {python} {script}");

        let mut process = Command::new(python)
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::Detector(format!("start {python} {script}: {e}")))?;

        let stdin = process.stdin.take().ok_or_else(|| Error::Detector("no stdin".into()))?;
        let stdout = process.stdout.take().ok_or_else(|| Error::Detector("no stdout".into()))?;
        let mut stdout = BufReader::new(stdout);

        let mut ready = String::new();
        stdout.read_line(&mut ready)?;
        if ready.trim() != "READY" {
            let _ = process.kill();
            return Err(Error::Detector(format!("helper did not signal ready, got {:?}", ready.trim())));
        }

        log::info!("MediaPipe hand detector ready");
        Ok(Self { process, stdin, stdout, min_confidence: min_confidence.clamp(0.0, 1.0), request: Vec::new() })
    }
}

impl HandDetector for MediaPipeDetector {
    fn name(&self) -> String {
        "MediaPipe Hands".to_string()
    }

    fn detect(&mut self, frame: &FrameBuffer) -> Result<Vec<HandLandmarks>, Error> {
        if frame.pixels.is_empty() {
            return Ok(Vec::new());
        }
        encode_frame(frame, &mut self.request);
        self.stdin.write_all(&self.request)?;
        self.stdin.flush()?;

        let mut response = String::new();
        if self.stdout.read_line(&mut response)? == 0 {
            return Err(Error::Detector("helper closed its output".into()));
        }
        let hands = parse_detection(&response, self.min_confidence)?;
        log::trace!("{} hand(s): {:?}", hands.len(), hands.iter().map(|h| h.handedness.as_str()).collect::<Vec<_>>());
        Ok(hands)
    }
}

impl Drop for MediaPipeDetector {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

/* ---------- Pointer-driven hand ---------- */

/// One synthetic hand whose index tip sits on the pointer.
/// Left button raises the index, right button raises index and middle.
#[derive(Debug, Default)]
pub struct PointerHands {
    sample: PointerSample,
}

impl PointerHands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the landmark set for a tip at normalized (x, y).
    pub fn synthesize(x: f32, y: f32, index_up: bool, middle_up: bool) -> HandLandmarks {
        const STEP: f32 = 0.03;
        let mut points = [Landmark::new(x, y + 6.0 * STEP); LANDMARK_COUNT];

        for (finger, up, dx) in [(Finger::Index, index_up, 0.0), (Finger::Middle, middle_up, STEP)] {
            let [tip, dip, pip, mcp] = finger.joints();
            // extended: joints stack upward to the tip. curled: tip folds back below the knuckle.
            let ys = if up { [0.0, 1.0, 2.0, 3.0] } else { [4.0, 3.5, 2.0, 3.0] };
            for (i, k) in [tip, dip, pip, mcp].into_iter().zip(ys) {
                points[i] = Landmark::new(x + dx, y + k * STEP);
            }
        }
        // the tip always sits on the pointer
        points[landmarks::INDEX_FINGER_TIP] = Landmark::new(x, y);
        if !index_up {
            points[landmarks::INDEX_FINGER_DIP].y = y + 3.5 * STEP;
        }
        HandLandmarks { points, handedness: "Right".to_string() }
    }
}

impl HandDetector for PointerHands {
    fn name(&self) -> String {
        "Pointer".to_string()
    }

    fn detect(&mut self, frame: &FrameBuffer) -> Result<Vec<HandLandmarks>, Error> {
        let Some((px, py)) = self.sample.position else {
            return Ok(Vec::new());
        };
        if frame.width == 0 || frame.height == 0 {
            return Ok(Vec::new());
        }
        let (x, y) = (px / frame.width as f32, py / frame.height as f32);
        let index_up = self.sample.left || self.sample.right;
        let middle_up = self.sample.right;
        Ok(vec![Self::synthesize(x, y, index_up, middle_up)])
    }

    fn feed_pointer(&mut self, sample: PointerSample) {
        self.sample = sample;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{FingerState, LandmarkInterpreter};

    fn hand_json(score: f32, n: usize) -> String {
        let pts: Vec<String> = (0..n).map(|i| format!(r#"{{"x":{},"y":0.5,"z":0.0}}"#, i as f32 / 100.0)).collect();
        format!(r#"{{"handedness":"Left","score":{score},"landmarks":[{}]}}"#, pts.join(","))
    }

    #[test]
    fn parses_hands_in_order_and_filters() {
        let line = format!(
            r#"{{"hands":[{},{},{}],"error":null}}"#,
            hand_json(0.9, 21),
            hand_json(0.2, 21),
            hand_json(0.95, 20)
        );
        let hands = parse_detection(&line, 0.5).unwrap();
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].handedness, "Left");
        assert_eq!(hands[0].points[8].x, 0.08);
    }

    #[test]
    fn empty_and_error_responses() {
        assert!(parse_detection(r#"{"hands":[]}"#, 0.5).unwrap().is_empty());
        assert!(matches!(parse_detection(r#"{"hands":[],"error":"boom"}"#, 0.5), Err(Error::Detector(_))));
        assert!(matches!(parse_detection("garbage\n", 0.5), Err(Error::Detector(_))));
    }

    #[test]
    fn frame_encoding_header_and_rgb() {
        let fb = FrameBuffer { width: 2, height: 1, pixels: vec![0x00_01_02_03, 0x00_0A_0B_0C] };
        let mut out = Vec::new();
        encode_frame(&fb, &mut out);
        assert_eq!(&out[..12], &[2, 0, 0, 0, 1, 0, 0, 0, 3, 0, 0, 0]);
        assert_eq!(&out[12..], &[1, 2, 3, 10, 11, 12]);
    }

    #[test]
    fn synthetic_hand_poses() {
        let pose = |i, m| FingerState::of(&PointerHands::synthesize(0.5, 0.4, i, m));
        assert_eq!(pose(true, false), FingerState { index: true, middle: false });
        assert_eq!(pose(true, true), FingerState { index: true, middle: true });
        assert_eq!(pose(false, false), FingerState { index: false, middle: false });
    }

    #[test]
    fn pointer_follows_mouse_and_clicks() {
        let frame = FrameBuffer::filled(640, 480, 0);
        let mut det = PointerHands::new();
        assert!(det.detect(&frame).unwrap().is_empty());

        let mut interp = LandmarkInterpreter::new();
        let mut tick = |det: &mut PointerHands, left, right| {
            det.feed_pointer(PointerSample { position: Some((320.0, 240.0)), left, right });
            interp.update(&det.detect(&frame).unwrap(), 640, 480)
        };

        let armed = tick(&mut det, true, true);
        assert_eq!(armed.fingertip.map(|p| (p.x, p.y)), Some((320, 240)));
        assert!(!armed.click);
        let release = tick(&mut det, true, false);
        assert!(release.click && release.draw);
    }
}
