// Crate error type. Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed
    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed
    #[error("Camera init error: {0}")]
    CameraInit(String), // Opening/starting the camera failed
    #[error("Camera frame error: {0}")]
    CameraFrame(String), // Grabbing/decoding a frame failed
    #[error("Camera timeout: no frame within {0} ms")]
    CameraTimeout(u64), // Camera opened but never delivered a first frame
    #[error("Hand detector error: {0}")]
    Detector(String), // Helper process failed or spoke garbage
    #[error("Config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
