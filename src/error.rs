// One error type for the whole program.
// Every variant states *where* things went wrong.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("window init error: {0}")]
    WindowInit(String), // Creating the window failed
    #[error("window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed
    #[error("camera init error: {0}")]
    CameraInit(String), // Opening/starting the camera failed
    #[error("camera frame error: {0}")]
    CameraFrame(String), // Grabbing/decoding a frame failed
    #[error("segmentation error: {0}")]
    Segmentation(String), // The mask model failed or went away
    #[error("surface error: {0}")]
    Surface(String), // Buffer shapes disagree, or a size is unusable
}

impl Error {
    pub fn segmentation(msg: impl Into<String>) -> Self {
        Self::Segmentation(msg.into())
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }
}
