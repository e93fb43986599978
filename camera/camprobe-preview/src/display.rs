use eframe::egui;
use machine_vision_formats::PixFmt;

use camprobe_iface::{Error, FrameBuffer, Result};

/// Copy a frame into an egui image. Mono8 and RGB8 are supported.
pub fn to_color_image(frame: &FrameBuffer) -> Result<egui::ColorImage> {
    let size = [frame.width() as usize, frame.height() as usize];
    let data = frame.packed_data();
    match frame.pixel_format() {
        PixFmt::Mono8 => Ok(egui::ColorImage::from_gray(size, &data)),
        PixFmt::RGB8 => Ok(egui::ColorImage::from_rgb(size, &data)),
        other => Err(Error::UnsupportedPixelFormat(other.to_string())),
    }
}

/// Largest size with the aspect ratio of `image` that fits in `available`.
pub fn fit_size(image: egui::Vec2, available: egui::Vec2) -> egui::Vec2 {
    if image.x <= 0.0 || image.y <= 0.0 {
        return egui::Vec2::ZERO;
    }
    let scale = (available.x / image.x).min(available.y / image.y).max(0.0);
    image * scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use camprobe_iface::HostTimingInfo;

    fn frame(width: u32, height: u32, stride: usize, pixfmt: PixFmt, data: Vec<u8>) -> FrameBuffer {
        let timing = HostTimingInfo {
            fno: 0,
            datetime: chrono::Utc::now(),
        };
        FrameBuffer::from_buf(width, height, stride, data, pixfmt, timing).unwrap()
    }

    #[test]
    fn mono8_with_padding() {
        // 3x2 image, rows padded to 4 bytes
        let data = vec![10, 20, 30, 0, 40, 50, 60, 0];
        let img = to_color_image(&frame(3, 2, 4, PixFmt::Mono8, data)).unwrap();
        assert_eq!(img.size, [3, 2]);
        assert_eq!(img.pixels[3], egui::Color32::from_gray(40));
        assert_eq!(img.pixels[5], egui::Color32::from_gray(60));
    }

    #[test]
    fn rgb8() {
        let data = vec![255, 0, 0, 0, 255, 0];
        let img = to_color_image(&frame(2, 1, 6, PixFmt::RGB8, data)).unwrap();
        assert_eq!(img.size, [2, 1]);
        assert_eq!(img.pixels[0], egui::Color32::from_rgb(255, 0, 0));
        assert_eq!(img.pixels[1], egui::Color32::from_rgb(0, 255, 0));
    }

    #[test]
    fn unsupported_format() {
        let data = vec![0; 4];
        let result = to_color_image(&frame(2, 2, 2, PixFmt::BayerRG8, data));
        assert!(matches!(result, Err(Error::UnsupportedPixelFormat(_))));
    }

    #[test]
    fn fit_keeps_aspect_ratio() {
        let wide = fit_size(egui::vec2(2736.0, 1824.0), egui::vec2(640.0, 640.0));
        assert_relative_eq!(wide.x, 640.0);
        assert_relative_eq!(wide.y, 640.0 * 1824.0 / 2736.0, epsilon = 1e-3);

        let tall = fit_size(egui::vec2(100.0, 400.0), egui::vec2(640.0, 640.0));
        assert_relative_eq!(tall.x, 160.0);
        assert_relative_eq!(tall.y, 640.0);

        assert_eq!(fit_size(egui::Vec2::ZERO, egui::vec2(640.0, 640.0)), egui::Vec2::ZERO);
    }
}
