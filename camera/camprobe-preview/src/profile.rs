use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use camprobe_iface::{Camera, PropId};

use crate::Result;

/// Camera settings applied before the preview starts.
///
/// The geometry is first set to the full sensor, then exposure and binning
/// are configured, then the binned geometry is set. The frame rate is either
/// fixed or the highest whole number the camera allows afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AcquisitionProfile {
    pub sensor_width: i64,
    pub sensor_height: i64,
    pub pixel_format: String,
    /// Exposure time in microseconds. `ExposureAuto` is switched off.
    pub exposure_time_us: f64,
    pub binning_horizontal: i64,
    pub binning_vertical: i64,
    pub width: i64,
    pub height: i64,
    /// Frames per second. If unset, the maximum truncated to an integer.
    pub frame_rate: Option<f64>,
}

impl Default for AcquisitionProfile {
    fn default() -> Self {
        Self {
            sensor_width: 5472,
            sensor_height: 3648,
            pixel_format: "Mono8".to_string(),
            exposure_time_us: 6250.0,
            binning_horizontal: 2,
            binning_vertical: 2,
            width: 2736,
            height: 1824,
            frame_rate: None,
        }
    }
}

impl AcquisitionProfile {
    /// Configure the camera. Returns the frame rate that was set.
    pub fn apply<C: Camera + ?Sized>(&self, cam: &mut C) -> camprobe_iface::Result<f64> {
        cam.set_resolution(self.sensor_width, self.sensor_height)?;
        cam.property_enum_set(PropId::PixelFormat.as_str(), &self.pixel_format)?;
        cam.property_enum_set(PropId::ExposureAuto.as_str(), "Off")?;
        cam.property_float_set(PropId::ExposureTime.as_str(), self.exposure_time_us)?;
        cam.property_int_set(
            PropId::BinningHorizontal.as_str(),
            self.binning_horizontal,
        )?;
        cam.property_int_set(PropId::BinningVertical.as_str(), self.binning_vertical)?;
        cam.set_resolution(self.width, self.height)?;
        cam.property_enum_set(PropId::PixelFormat.as_str(), &self.pixel_format)?;

        let fps_name = PropId::AcquisitionFrameRate.as_str();
        let frame_rate = match self.frame_rate {
            Some(frame_rate) => frame_rate,
            None => {
                let max = cam.property_maximum(fps_name)?;
                let max = max.as_f64().ok_or_else(|| {
                    camprobe_iface::Error::property(fps_name, format!("non-numeric maximum {max}"))
                })?;
                debug!("maximum frame rate {max}");
                max.trunc()
            }
        };
        cam.property_float_set(fps_name, frame_rate)?;

        info!(
            "{}x{} {} (binning {}x{}), exposure {} us, {} fps",
            self.width,
            self.height,
            self.pixel_format,
            self.binning_horizontal,
            self.binning_vertical,
            self.exposure_time_us,
            frame_rate
        );
        Ok(frame_rate)
    }
}

/// Parse a `.toml` file and return an [AcquisitionProfile].
///
/// Keys not present in the file keep their default value.
pub fn parse_profile_file<P: AsRef<std::path::Path>>(fname: P) -> Result<AcquisitionProfile> {
    use std::io::Read;

    let mut file = std::fs::File::open(fname.as_ref())?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    let profile: AcquisitionProfile = toml::from_str(&contents)?;
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn partial_profile_keeps_defaults() {
        let profile: AcquisitionProfile = toml::from_str(
            r#"
            exposure_time_us = 10000.0
            frame_rate = 20.0
            "#,
        )
        .unwrap();
        assert_eq!(profile.exposure_time_us, 10000.0);
        assert_eq!(profile.frame_rate, Some(20.0));
        assert_eq!(profile.width, 2736);
        assert_eq!(profile.pixel_format, "Mono8");
    }

    #[test]
    fn empty_profile_is_default() {
        let profile: AcquisitionProfile = toml::from_str("").unwrap();
        assert_eq!(profile, AcquisitionProfile::default());
    }

    #[test]
    fn unknown_key_rejected() {
        let result: std::result::Result<AcquisitionProfile, _> = toml::from_str("gamma = 1.0");
        assert!(result.is_err());
    }

    #[test]
    fn parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        std::fs::write(&path, "binning_horizontal = 4\nbinning_vertical = 4\n").unwrap();
        let profile = parse_profile_file(&path).unwrap();
        assert_eq!(profile.binning_horizontal, 4);
        assert_eq!(profile.binning_vertical, 4);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(parse_profile_file(missing), Err(Error::Io { .. })));

        std::fs::write(&path, "width = \"wide\"\n").unwrap();
        assert!(matches!(parse_profile_file(&path), Err(Error::TomlDe { .. })));
    }
}
