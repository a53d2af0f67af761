//! [`FrameFileCamera`] – replays still images as camera frames.
//!
//! Each capture decodes the next file in the list (PNG or PNM) and converts
//! it to RGB24.  Useful for reconstructing from photos taken offline, one
//! per orientation phase.

use std::path::PathBuf;

use cubesight_types::CubeError;
use tracing::debug;

use crate::camera::{Camera, CameraFrame};

/// A camera backed by an ordered list of image files.
pub struct FrameFileCamera {
    id: String,
    paths: Vec<PathBuf>,
    next: usize,
}

impl FrameFileCamera {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            id: "frame_files".to_string(),
            paths,
            next: 0,
        }
    }

    fn fault(&self, details: String) -> CubeError {
        CubeError::Capture {
            device: self.id.clone(),
            details,
        }
    }
}

impl Camera for FrameFileCamera {
    fn id(&self) -> &str {
        &self.id
    }

    /// Rewinds to the first file.
    fn acquire(&mut self) -> Result<(), CubeError> {
        self.next = 0;
        Ok(())
    }

    fn capture(&mut self) -> Result<CameraFrame, CubeError> {
        let path = self
            .paths
            .get(self.next)
            .cloned()
            .ok_or_else(|| self.fault(format!("no frame file left after {}", self.next)))?;
        self.next += 1;

        let img = image::open(&path)
            .map_err(|e| self.fault(format!("cannot decode {}: {e}", path.display())))?
            .to_rgb8();
        debug!(path = %path.display(), width = img.width(), height = img.height(), "frame loaded");
        Ok(CameraFrame {
            width: img.width(),
            height: img.height(),
            data: img.into_raw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubesight_types::Rgb;
    use image::{ImageBuffer, Rgb as ImgRgb};

    fn write_png(path: &std::path::Path, color: [u8; 3]) {
        let img = ImageBuffer::from_pixel(4, 3, ImgRgb(color));
        img.save(path).unwrap();
    }

    #[test]
    fn replays_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        write_png(&a, [255, 0, 0]);
        write_png(&b, [0, 0, 255]);

        let mut cam = FrameFileCamera::new(vec![a, b]);
        cam.acquire().unwrap();
        let first = cam.capture().unwrap();
        assert_eq!((first.width, first.height), (4, 3));
        assert_eq!(first.pixel(3, 2), Some(Rgb::new(255, 0, 0)));
        let second = cam.capture().unwrap();
        assert_eq!(second.pixel(0, 0), Some(Rgb::new(0, 0, 255)));
    }

    #[test]
    fn running_out_of_files_is_a_capture_error() {
        let mut cam = FrameFileCamera::new(Vec::new());
        assert!(matches!(cam.capture(), Err(CubeError::Capture { .. })));
    }

    #[test]
    fn undecodable_file_is_a_capture_error() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.png");
        std::fs::write(&bogus, b"not an image").unwrap();
        let mut cam = FrameFileCamera::new(vec![bogus]);
        assert!(matches!(cam.capture(), Err(CubeError::Capture { .. })));
    }
}
