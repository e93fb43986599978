//! Live preview of a camera stream.
//!
//! A [CaptureWorker] thread owns the opened camera and publishes each new
//! frame into a [FrameSlot]. The egui [PreviewApp] takes the latest frame on
//! each repaint, shows it scaled to the window, and reports the displayed
//! frame rate in the window title using an [FpsCounter].

use camprobe_iface::CameraModule;
use tracing::info;

mod app;
mod display;
mod fps;
mod profile;
mod slot;
mod worker;

pub use app::PreviewApp;
pub use display::{fit_size, to_color_image};
pub use fps::{DEFAULT_INTERVAL, FpsCounter, window_title};
pub use profile::{AcquisitionProfile, parse_profile_file};
pub use slot::FrameSlot;
pub use worker::{CaptureWorker, TickOutcome, capture_tick};

/// Application name, also used for the native window id.
pub const APP_NAME: &str = "camprobe-preview";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("camera error: {source}")]
    Camera {
        #[from]
        source: camprobe_iface::Error,
    },
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("could not parse profile: {source}")]
    TomlDe {
        #[from]
        source: toml::de::Error,
    },
}

fn _test_error_is_send() {
    // Compile-time test to ensure Error implements Send trait.
    fn implements<T: Send>() {}
    implements::<Error>();
}

pub type Result<T> = std::result::Result<T, Error>;

/// Open a device and apply `profile` to it. Returns the camera and the
/// frame rate that was set.
///
/// If no device is attached this returns [camprobe_iface::Error::NoDevices]
/// before opening anything.
pub fn open_preview_camera<M: CameraModule>(
    module: &mut M,
    device: Option<&str>,
    profile: &AcquisitionProfile,
) -> Result<(M::CameraType, f64)> {
    let infos = camprobe_iface::print_device_list(module)?;
    let unique_name = camprobe_iface::select_device(&infos, device)?
        .unique_name()
        .to_string();

    let mut cam = module.open(&unique_name)?;
    info!("opened {}", camprobe_iface::format_device_info(&cam));
    let frame_rate = profile.apply(&mut cam)?;
    Ok((cam, frame_rate))
}
