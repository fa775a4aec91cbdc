// Command-line flags. Anything set here wins over the config file.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{AppConfig, DetectorKind};

/// Draw on the live camera feed with your index finger.
///
/// Index up: draw. Index + middle up, then drop the middle: click a button.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Camera index (overrides the config file)
    #[arg(short, long)]
    pub cam_index: Option<u32>,

    /// Config file (JSON); created with defaults when missing
    #[arg(long, default_value = AppConfig::DEFAULT_PATH)]
    pub config: PathBuf,

    /// Drive the hand with the mouse: left = draw, right = arm, release right while holding left = click
    #[arg(long, default_value_t = false)]
    pub pointer: bool,

    /// Do not mirror the camera image
    #[arg(long, default_value_t = false)]
    pub no_mirror: bool,

    /// List available cameras and exit
    #[arg(long)]
    pub list: bool,
}

impl Args {
    /// Command-line flags win over the file.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(index) = self.cam_index {
            config.camera.index = index;
        }
        if self.pointer {
            config.detector.kind = DetectorKind::Pointer;
        }
        if self.no_mirror {
            config.camera.mirror = false;
        }
    }
}
