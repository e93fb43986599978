use machine_vision_formats as formats;

use formats::PixFmt;

use crate::{Error, Result};

/// Timing information acquired on the host computer.
///
/// This is not necessarily as accurate as a device timestamp, but it is always
/// present.
#[derive(Debug, Clone)]
pub struct HostTimingInfo {
    /// The frame number as counted by the host since acquisition start.
    pub fno: usize,
    /// The timestamp of the frame when it was acquired by the host.
    pub datetime: chrono::DateTime<chrono::Utc>,
}

/// A single image copied out of a capture session.
#[derive(Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    stride: usize,
    pixel_format: PixFmt,
    image_data: Vec<u8>,
    /// Frame timing information acquired by the host.
    pub host_timing: HostTimingInfo,
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("pixel_format", &self.pixel_format)
            .field("fno", &self.host_timing.fno)
            .finish_non_exhaustive()
    }
}

impl FrameBuffer {
    /// Wrap a pixel buffer, checking it is large enough for the given geometry.
    pub fn from_buf(
        width: u32,
        height: u32,
        stride: usize,
        image_data: Vec<u8>,
        pixel_format: PixFmt,
        host_timing: HostTimingInfo,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidFrame(format!("empty image {width}x{height}")));
        }
        let min_stride = width as usize * pixel_format.bits_per_pixel() as usize / 8;
        if stride < min_stride {
            return Err(Error::InvalidFrame(format!(
                "stride {stride} smaller than minimum {min_stride}"
            )));
        }
        let needed = stride * height as usize;
        if image_data.len() < needed {
            return Err(Error::InvalidFrame(format!(
                "buffer of {} bytes too small for {width}x{height} with stride {stride}",
                image_data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            stride,
            pixel_format,
            image_data,
            host_timing,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    pub fn stride(&self) -> usize {
        self.stride
    }
    pub fn pixel_format(&self) -> PixFmt {
        self.pixel_format
    }
    pub fn image_data(&self) -> &[u8] {
        &self.image_data
    }

    /// Number of 8-bit channels for displayable formats.
    ///
    /// `Mono8` is a 2-D array (one channel), `RGB8` is H x W x 3.
    pub fn channels(&self) -> Result<usize> {
        match self.pixel_format {
            PixFmt::Mono8 => Ok(1),
            PixFmt::RGB8 => Ok(3),
            other => Err(Error::UnsupportedPixelFormat(other.to_string())),
        }
    }

    /// Iterate over the rows of the image, without stride padding.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let row_len = self.width as usize * self.pixel_format.bits_per_pixel() as usize / 8;
        self.image_data
            .chunks(self.stride)
            .take(self.height as usize)
            .map(move |row| &row[..row_len])
    }

    /// Copy the pixel data into a tightly packed buffer (no row padding).
    pub fn packed_data(&self) -> Vec<u8> {
        let row_len = self.width as usize * self.pixel_format.bits_per_pixel() as usize / 8;
        if row_len == self.stride {
            return self.image_data[..row_len * self.height as usize].to_vec();
        }
        let mut out = Vec::with_capacity(row_len * self.height as usize);
        for row in self.rows() {
            out.extend_from_slice(row);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> HostTimingInfo {
        HostTimingInfo {
            fno: 0,
            datetime: chrono::Utc::now(),
        }
    }

    #[test]
    fn rejects_short_buffer() {
        let result = FrameBuffer::from_buf(4, 4, 4, vec![0; 15], PixFmt::Mono8, timing());
        assert!(matches!(result, Err(Error::InvalidFrame(_))));
    }

    #[test]
    fn rejects_small_stride() {
        let result = FrameBuffer::from_buf(4, 2, 8, vec![0; 24], PixFmt::RGB8, timing());
        assert!(matches!(result, Err(Error::InvalidFrame(_))));
    }

    #[test]
    fn packs_padded_rows() {
        // 2x2 mono with stride 4
        let data = vec![1, 2, 0, 0, 3, 4, 0, 0];
        let frame = FrameBuffer::from_buf(2, 2, 4, data, PixFmt::Mono8, timing()).unwrap();
        assert_eq!(frame.packed_data(), vec![1, 2, 3, 4]);
        assert_eq!(frame.channels().unwrap(), 1);
    }

    #[test]
    fn channels_of_unsupported_format() {
        let frame =
            FrameBuffer::from_buf(2, 2, 2, vec![0; 4], PixFmt::BayerRG8, timing()).unwrap();
        assert!(matches!(
            frame.channels(),
            Err(Error::UnsupportedPixelFormat(_))
        ));
    }
}
