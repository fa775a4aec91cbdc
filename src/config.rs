// Runtime settings, read from a JSON file in the working directory.
// Every section falls back to its defaults field by field.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::canvas::{BlendWeights, ToolState};
use crate::error::Error;
use crate::palette::RED;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub camera: CameraConfig,
    pub canvas: CanvasConfig,
    pub brush: BrushConfig,
    pub detector: DetectorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub mirror: bool,
    /// Grab frames on a background thread instead of blocking the loop.
    pub background_capture: bool,
    pub startup_timeout_ms: u64,
    pub startup_poll_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Board size as a fraction of the frame (both axes).
    pub size_fraction: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub frame_weight: f32,
    pub canvas_weight: f32,
    pub brightness: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    pub default_size: u32,
    pub eraser_multiplier: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    /// MediaPipe Hands through the Python helper.
    Mediapipe,
    /// Synthetic hand that follows the window pointer.
    Pointer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub kind: DetectorKind,
    pub python: String,
    pub script: String,
    pub min_confidence: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: 640,
            height: 480,
            fps: 30,
            mirror: true,
            background_capture: true,
            startup_timeout_ms: 5000,
            startup_poll_ms: 100,
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            size_fraction: 0.79,
            offset_x: 0.05,
            offset_y: 0.20,
            frame_weight: 0.5,
            canvas_weight: 0.5,
            brightness: 0.5,
        }
    }
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self { default_size: 10, eraser_multiplier: 2 }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            kind: DetectorKind::Mediapipe,
            python: "python3".to_string(),
            script: "scripts/hand_detect.py".to_string(),
            min_confidence: 0.5,
        }
    }
}

impl CanvasConfig {
    pub fn weights(&self) -> BlendWeights {
        BlendWeights { frame_weight: self.frame_weight, canvas_weight: self.canvas_weight, brightness: self.brightness }
    }
}

impl BrushConfig {
    /// Starting tools: red pen at the default size.
    pub fn initial_tool(&self) -> ToolState {
        ToolState { color: RED, brush_size: self.default_size, eraser: false, eraser_multiplier: self.eraser_multiplier }
    }
}

impl AppConfig {
    pub const DEFAULT_PATH: &'static str = "air_canvas.json";

    /// Load from `path`. A missing file is created with defaults; an unreadable
    /// one is reported and replaced by defaults in memory.
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            log::info!("Configuration file not found. Creating default at {}", path.display());
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        match Self::from_json(&content) {
            Ok(c) => {
                log::info!("Loaded configuration from {}", path.display());
                Ok(c)
            }
            Err(e) => {
                log::warn!("{e}. Loading defaults.");
                Ok(Self::default())
            }
        }
    }

    /// Parse JSON; missing fields take their defaults.
    pub fn from_json(content: &str) -> Result<Self, Error> {
        serde_json::from_str(content).map_err(|e| Error::Config(format!("parse: {e}")))
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| Error::Config(format!("serialize: {e}")))?;
        fs::write(path, content)?;
        Ok(())
    }
}
