//! Generic `Camera` trait, the RGB24 [`CameraFrame`] it produces, and the
//! scoped [`CameraSession`] that brackets a reconstruction.

use cubesight_types::{CubeError, Rgb};

/// A raw RGB24 frame returned by a camera driver, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Raw pixel data, three bytes per pixel.
    pub data: Vec<u8>,
}

impl CameraFrame {
    /// A frame of the given size filled with `fill`.
    pub fn filled(width: u32, height: u32, fill: Rgb) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 3);
        for _ in 0..pixels {
            data.extend_from_slice(&[fill.r, fill.g, fill.b]);
        }
        Self {
            width,
            height,
            data,
        }
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 3;
        (offset + 3 <= self.data.len()).then_some(offset)
    }

    /// Read the pixel at `(x, y)`.  Returns `None` when the coordinate lies
    /// outside the frame or the buffer is shorter than its declared size.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        let o = self.offset(x, y)?;
        Some(Rgb::new(self.data[o], self.data[o + 1], self.data[o + 2]))
    }

    /// Write the pixel at `(x, y)`.  Out-of-frame writes are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        if let Some(o) = self.offset(x, y) {
            self.data[o..o + 3].copy_from_slice(&[color.r, color.g, color.b]);
        }
    }
}

/// A camera or image-capture device.
///
/// The device is opened with [`acquire`][Camera::acquire] before the first
/// capture and closed with [`release`][Camera::release] afterwards; use
/// [`CameraSession`] rather than calling the pair by hand.
pub trait Camera: Send {
    /// Stable identifier for this camera, e.g. `"top_rgb"`.
    fn id(&self) -> &str;

    /// Open the device.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::Capture`] if the device cannot be opened.
    fn acquire(&mut self) -> Result<(), CubeError> {
        Ok(())
    }

    /// Capture and return the next available frame.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::Capture`] if the frame cannot be captured
    /// (e.g. the device is disconnected or the buffer is unavailable).
    fn capture(&mut self) -> Result<CameraFrame, CubeError>;

    /// Close the device.  Must tolerate being called after a failed capture.
    fn release(&mut self) {}
}

/// Scoped camera acquisition: the camera is acquired by
/// [`CameraSession::open`] and released exactly once when the session is
/// dropped, on success and error paths alike.
pub struct CameraSession<'a> {
    camera: &'a mut dyn Camera,
}

impl<'a> CameraSession<'a> {
    /// Acquire `camera`.  Nothing is released if acquisition itself fails.
    ///
    /// # Errors
    ///
    /// Propagates the camera's acquisition error.
    pub fn open(camera: &'a mut dyn Camera) -> Result<Self, CubeError> {
        camera.acquire()?;
        tracing::debug!(camera = camera.id(), "camera acquired");
        Ok(Self { camera })
    }

    /// Capture one frame from the held camera.
    pub fn capture(&mut self) -> Result<CameraFrame, CubeError> {
        self.camera.capture()
    }
}

impl Drop for CameraSession<'_> {
    fn drop(&mut self) {
        self.camera.release();
        tracing::debug!(camera = self.camera.id(), "camera released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingCamera {
        acquired: u32,
        released: u32,
        fail_acquire: bool,
    }

    impl Camera for CountingCamera {
        fn id(&self) -> &str {
            "counting"
        }

        fn acquire(&mut self) -> Result<(), CubeError> {
            if self.fail_acquire {
                return Err(CubeError::Capture {
                    device: "counting".into(),
                    details: "no device".into(),
                });
            }
            self.acquired += 1;
            Ok(())
        }

        fn capture(&mut self) -> Result<CameraFrame, CubeError> {
            Ok(CameraFrame::filled(2, 2, Rgb::new(1, 2, 3)))
        }

        fn release(&mut self) {
            self.released += 1;
        }
    }

    #[test]
    fn pixel_reads_row_major_rgb() {
        let mut frame = CameraFrame::filled(3, 2, Rgb::new(0, 0, 0));
        frame.put_pixel(2, 1, Rgb::new(10, 20, 30));
        assert_eq!(frame.pixel(2, 1), Some(Rgb::new(10, 20, 30)));
        assert_eq!(frame.data[(1 * 3 + 2) * 3], 10);
        assert_eq!(frame.pixel(0, 0), Some(Rgb::new(0, 0, 0)));
    }

    #[test]
    fn pixel_out_of_frame_is_none() {
        let frame = CameraFrame::filled(3, 2, Rgb::new(0, 0, 0));
        assert_eq!(frame.pixel(3, 0), None);
        assert_eq!(frame.pixel(0, 2), None);
    }

    #[test]
    fn pixel_on_truncated_buffer_is_none() {
        let frame = CameraFrame {
            width: 2,
            height: 2,
            data: vec![0u8; 6],
        };
        assert!(frame.pixel(1, 0).is_some());
        assert_eq!(frame.pixel(0, 1), None);
    }

    #[test]
    fn session_releases_once_on_drop() {
        let mut cam = CountingCamera {
            acquired: 0,
            released: 0,
            fail_acquire: false,
        };
        {
            let mut session = CameraSession::open(&mut cam).unwrap();
            assert_eq!(session.capture().unwrap().width, 2);
        }
        assert_eq!(cam.acquired, 1);
        assert_eq!(cam.released, 1);
    }

    #[test]
    fn failed_acquire_does_not_release() {
        let mut cam = CountingCamera {
            acquired: 0,
            released: 0,
            fail_acquire: true,
        };
        assert!(CameraSession::open(&mut cam).is_err());
        assert_eq!(cam.released, 0);
    }
}
