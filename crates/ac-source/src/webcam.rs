use ac_core::config::CaptureHints;
use ac_core::frame::{Frame, PixelLayout};
use ac_core::traits::CaptureDevice;
use nokhwa::Camera;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType, Resolution};

use crate::error::SourceError;

/// Caméra native via nokhwa (V4L2 / AVFoundation / Media Foundation).
///
/// # Example
/// ```no_run
/// use ac_core::traits::CaptureDevice;
/// use ac_source::webcam::NokhwaCamera;
/// let mut cam = NokhwaCamera::open(0).unwrap();
/// let _ = cam.read_frame();
/// ```
pub struct NokhwaCamera {
    index: u32,
    camera: Camera,
    streaming: bool,
}

impl NokhwaCamera {
    /// Open device `index` and start its stream.
    ///
    /// # Errors
    /// Returns [`SourceError::DeviceUnavailable`] if the camera cannot be
    /// opened or its stream cannot start.
    pub fn open(index: u32) -> Result<Self, SourceError> {
        let unavailable = |e: nokhwa::NokhwaError| SourceError::DeviceUnavailable {
            index,
            reason: e.to_string(),
        };
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), requested).map_err(unavailable)?;
        camera.open_stream().map_err(unavailable)?;
        log::info!("Caméra {index} ouverte via nokhwa : {}", camera.info().human_name());
        Ok(Self {
            index,
            camera,
            streaming: true,
        })
    }
}

impl CaptureDevice for NokhwaCamera {
    fn configure(&mut self, hints: &CaptureHints) {
        if let Err(e) = self
            .camera
            .set_resolution(Resolution::new(hints.width, hints.height))
        {
            log::warn!("Caméra {} : résolution {}x{} ignorée : {e}", self.index, hints.width, hints.height);
        }
        if let Err(e) = self.camera.set_frame_rate(hints.fps) {
            log::warn!("Caméra {} : {} fps ignorés : {e}", self.index, hints.fps);
        }
    }

    fn read_frame(&mut self) -> Option<Frame> {
        if !self.streaming {
            return None;
        }
        let buffer = match self.camera.frame() {
            Ok(b) => b,
            Err(e) => {
                log::warn!("Caméra {} : lecture impossible : {e}", self.index);
                return None;
            }
        };
        let decoded = match buffer.decode_image::<RgbFormat>() {
            Ok(img) => img,
            Err(e) => {
                log::warn!("Caméra {} : décodage impossible : {e}", self.index);
                return None;
            }
        };
        let (width, height) = decoded.dimensions();
        Frame::new(decoded.into_raw(), width, height, PixelLayout::Rgb).ok()
    }

    fn release(&mut self) {
        if self.streaming {
            if let Err(e) = self.camera.stop_stream() {
                log::warn!("Caméra {} : arrêt du flux : {e}", self.index);
            }
            self.streaming = false;
            log::info!("Caméra {} libérée", self.index);
        }
    }
}

impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        self.release();
    }
}
