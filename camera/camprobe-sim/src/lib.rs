//! Simulated camera backend.
//!
//! Models the property map and capture session of a GenICam camera well
//! enough to drive the camprobe tools without hardware: value bounds and
//! increments, read-only and locked features, binning-dependent geometry, a
//! frame rate limited by height and exposure, and a software trigger.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use camprobe_iface::{
    Error, FrameBuffer, HostTimingInfo, PropId, PropertyDescriptor, Result,
};
use machine_vision_formats::PixFmt;

mod nodemap;
mod pattern;

pub use nodemap::NodeSnapshot;
use nodemap::{NodeMap, SensorSpec};

/// Environment variable read by [SimConfig::from_env].
pub const NUM_DEVICES_ENV_VAR: &str = "CAMPROBE_SIM_NUM_DEVICES";

const VENDOR: &str = "Simulated Vision";

/// Configuration of the simulated device set.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub num_devices: usize,
    pub model_name: String,
    pub sensor_width: i64,
    pub sensor_height: i64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_devices: 1,
            model_name: "SIM-33UX183".to_string(),
            sensor_width: 5472,
            sensor_height: 3648,
        }
    }
}

impl SimConfig {
    /// Default configuration with the device count taken from
    /// `CAMPROBE_SIM_NUM_DEVICES`, if set.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Ok(value) = std::env::var(NUM_DEVICES_ENV_VAR) {
            cfg.num_devices = value.trim().parse().map_err(|e| {
                Error::BackendError(anyhow::anyhow!(
                    "invalid {NUM_DEVICES_ENV_VAR}=\"{value}\": {e}"
                ))
            })?;
        }
        Ok(cfg)
    }
}

pub struct SimModule {
    infos: Vec<SimDeviceInfo>,
    config: SimConfig,
}

impl SimModule {
    pub fn new(config: SimConfig) -> Self {
        let infos = (0..config.num_devices)
            .map(|i| {
                let serial = format!("{}", 40910001 + i);
                SimDeviceInfo {
                    name: format!("{VENDOR}-{serial}"),
                    serial,
                    model: config.model_name.clone(),
                    vendor: VENDOR.to_string(),
                }
            })
            .collect();
        Self { infos, config }
    }
}

pub fn new_module() -> Result<SimModule> {
    Ok(SimModule::new(SimConfig::from_env()?))
}

impl camprobe_iface::CameraModule for SimModule {
    type CameraType = SimCamera;

    fn name(&self) -> &str {
        "sim"
    }

    fn device_infos(&self) -> Result<Vec<Box<dyn camprobe_iface::DeviceInfo>>> {
        let infos = self
            .infos
            .iter()
            .map(|info| {
                let ci: Box<dyn camprobe_iface::DeviceInfo> = Box::new(info.clone()); // explicitly perform type erasure
                ci
            })
            .collect();
        Ok(infos)
    }

    fn open(&mut self, unique_name: &str) -> Result<SimCamera> {
        let info = self
            .infos
            .iter()
            .find(|info| info.name == unique_name)
            .cloned()
            .ok_or_else(|| Error::DeviceNotFound(unique_name.to_string()))?;
        let spec = SensorSpec {
            vendor: info.vendor.clone(),
            model: info.model.clone(),
            serial: info.serial.clone(),
            width: self.config.sensor_width,
            height: self.config.sensor_height,
        };
        debug!("opening simulated camera {}", info.name);
        Ok(SimCamera {
            nodes: NodeMap::new(&spec),
            info,
            acquisition_started: false,
            store_fno: 0,
            next_frame_at: None,
            trigger_pending: false,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SimDeviceInfo {
    name: String,
    serial: String,
    model: String,
    vendor: String,
}

impl camprobe_iface::DeviceInfo for SimDeviceInfo {
    fn unique_name(&self) -> &str {
        &self.name
    }
    fn model_name(&self) -> &str {
        &self.model
    }
    fn serial(&self) -> &str {
        &self.serial
    }
    fn vendor(&self) -> &str {
        &self.vendor
    }
}

pub struct SimCamera {
    info: SimDeviceInfo,
    nodes: NodeMap,
    acquisition_started: bool,
    store_fno: usize,
    next_frame_at: Option<Instant>,
    trigger_pending: bool,
}

fn _test_camera_is_send() {
    // Compile-time test to ensure SimCamera implements Send trait.
    fn implements<T: Send>() {}
    implements::<SimCamera>();
}

fn str_to_pixel_format(name: &str) -> Result<PixFmt> {
    match name {
        "Mono8" => Ok(PixFmt::Mono8),
        "RGB8" => Ok(PixFmt::RGB8),
        other => Err(Error::UnsupportedPixelFormat(other.to_string())),
    }
}

impl SimCamera {
    fn frame_period(&self) -> Result<Duration> {
        let fps = self.nodes.float(PropId::AcquisitionFrameRate.as_str())?;
        Ok(Duration::from_secs_f64(1.0 / fps))
    }

    fn trigger_mode_on(&self) -> Result<bool> {
        Ok(self.nodes.enumeration(PropId::TriggerMode.as_str())? == "On")
    }

    fn make_frame(&mut self) -> Result<FrameBuffer> {
        let width = self.nodes.int(PropId::Width.as_str())?;
        let height = self.nodes.int(PropId::Height.as_str())?;
        let pixel_format =
            str_to_pixel_format(&self.nodes.enumeration(PropId::PixelFormat.as_str())?)?;
        let width: u32 = width.try_into().map_err(anyhow::Error::new)?;
        let height: u32 = height.try_into().map_err(anyhow::Error::new)?;
        let stride = width as usize * pixel_format.bits_per_pixel() as usize / 8;
        let mut image_data = pattern::synthesize(
            width as usize,
            height as usize,
            pixel_format,
            self.store_fno,
        );
        if self.nodes.boolean(PropId::ReverseX.as_str())? {
            pattern::flip_horizontal(&mut image_data, width as usize, stride / width as usize);
        }
        let host_timing = HostTimingInfo {
            fno: self.store_fno,
            datetime: chrono::Utc::now(),
        };
        self.store_fno += 1;
        FrameBuffer::from_buf(width, height, stride, image_data, pixel_format, host_timing)
    }
}

impl camprobe_iface::DeviceInfo for SimCamera {
    fn unique_name(&self) -> &str {
        &self.info.name
    }
    fn model_name(&self) -> &str {
        &self.info.model
    }
    fn serial(&self) -> &str {
        &self.info.serial
    }
    fn vendor(&self) -> &str {
        &self.info.vendor
    }
}

impl camprobe_iface::Camera for SimCamera {
    // ----- start: weakly typed property map access -----

    fn command_execute(&mut self, name: &str) -> Result<()> {
        self.nodes.check_command(name)?;
        if name == PropId::TriggerSoftware.as_str() {
            if !self.acquisition_started {
                return Err(Error::property(name, "acquisition not started"));
            }
            self.trigger_pending = true;
        }
        Ok(())
    }

    fn property_bool(&self, name: &str) -> Result<bool> {
        self.nodes.boolean(name)
    }

    fn property_bool_set(&mut self, name: &str, value: bool) -> Result<()> {
        self.nodes.set_bool(name, value)
    }

    fn property_enum(&self, name: &str) -> Result<String> {
        self.nodes.enumeration(name)
    }

    fn property_enum_set(&mut self, name: &str, value: &str) -> Result<()> {
        self.nodes.set_enum(name, value)
    }

    fn property_float(&self, name: &str) -> Result<f64> {
        self.nodes.float(name)
    }

    fn property_float_set(&mut self, name: &str, value: f64) -> Result<()> {
        self.nodes.set_float(name, value)
    }

    fn property_int(&self, name: &str) -> Result<i64> {
        self.nodes.int(name)
    }

    fn property_int_set(&mut self, name: &str, value: i64) -> Result<()> {
        self.nodes.set_int(name, value)
    }

    // ----- end: weakly typed property map access -----

    fn property_find(&self, name: &str) -> Result<Box<dyn PropertyDescriptor>> {
        Ok(Box::new(self.nodes.snapshot(name)?))
    }

    fn properties(&self) -> Result<Vec<Box<dyn PropertyDescriptor>>> {
        Ok(self
            .nodes
            .snapshots()
            .into_iter()
            .map(|snap| {
                let descriptor: Box<dyn PropertyDescriptor> = Box::new(snap);
                descriptor
            })
            .collect())
    }

    fn acquisition_start(&mut self) -> Result<()> {
        if self.acquisition_started {
            return Err(Error::from("acquisition already started"));
        }
        self.nodes.set_tl_params_locked(true);
        self.acquisition_started = true;
        self.store_fno = 0;
        self.next_frame_at = None;
        self.trigger_pending = false;
        info!(
            "{}: acquisition started at {} fps",
            self.info.name,
            self.nodes.float(PropId::AcquisitionFrameRate.as_str())?
        );
        Ok(())
    }

    fn acquisition_stop(&mut self) -> Result<()> {
        if self.acquisition_started {
            self.nodes.set_tl_params_locked(false);
            self.acquisition_started = false;
            info!("{}: acquisition stopped", self.info.name);
        }
        Ok(())
    }

    fn is_acquiring(&self) -> bool {
        self.acquisition_started
    }

    fn snap_single(&mut self, timeout: Duration) -> Result<FrameBuffer> {
        if !self.acquisition_started {
            return Err(Error::from("acquisition not started"));
        }

        if self.trigger_mode_on()? {
            if !self.trigger_pending {
                std::thread::sleep(timeout);
                return Err(Error::Timeout);
            }
            self.trigger_pending = false;
            return self.make_frame();
        }

        let now = Instant::now();
        let due = match self.next_frame_at {
            Some(due) if due > now => due,
            _ => now,
        };
        let wait = due - now;
        if wait > timeout {
            std::thread::sleep(timeout);
            return Err(Error::Timeout);
        }
        std::thread::sleep(wait);
        self.next_frame_at = Some(due + self.frame_period()?);
        self.make_frame()
    }
}

impl Drop for SimCamera {
    fn drop(&mut self) {
        if self.acquisition_started {
            debug!("{}: stopping acquisition on drop", self.info.name);
            self.acquisition_started = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camprobe_iface::{Camera, CameraModule};

    fn open_first() -> SimCamera {
        let mut module = SimModule::new(SimConfig::default());
        let infos = module.device_infos().unwrap();
        let name = infos[0].unique_name().to_string();
        module.open(&name).unwrap()
    }

    #[test]
    fn enumerates_configured_devices() {
        let module = SimModule::new(SimConfig {
            num_devices: 3,
            ..Default::default()
        });
        let infos = module.device_infos().unwrap();
        assert_eq!(infos.len(), 3);
        assert_eq!(infos[0].serial(), "40910001");
        assert_eq!(infos[2].unique_name(), "Simulated Vision-40910003");
        assert_eq!(infos[1].model_name(), "SIM-33UX183");
    }

    #[test]
    fn no_devices() {
        let mut module = SimModule::new(SimConfig {
            num_devices: 0,
            ..Default::default()
        });
        assert!(module.device_infos().unwrap().is_empty());
        assert!(matches!(
            module.open("Simulated Vision-40910001"),
            Err(Error::DeviceNotFound(_))
        ));
    }

    #[test]
    fn snap_requires_acquisition() {
        let mut cam = open_first();
        assert!(cam.snap_single(Duration::from_millis(10)).is_err());
    }

    #[test]
    fn snap_frames_with_current_geometry() {
        let mut cam = open_first();
        cam.set_resolution(640, 480).unwrap();
        cam.property_enum_set("PixelFormat", "RGB8").unwrap();
        cam.property_enum_set("ExposureAuto", "Off").unwrap();
        cam.property_float_set("ExposureTime", 1000.0).unwrap();
        let max = cam.property_maximum("AcquisitionFrameRate").unwrap();
        cam.property_float_set("AcquisitionFrameRate", max.as_f64().unwrap())
            .unwrap();
        cam.acquisition_start().unwrap();
        assert!(cam.property_int_set("Width", 320).is_err());
        for expected_fno in 0..3 {
            let frame = cam.snap_single(Duration::from_millis(1000)).unwrap();
            assert_eq!(frame.width(), 640);
            assert_eq!(frame.height(), 480);
            assert_eq!(frame.pixel_format(), PixFmt::RGB8);
            assert_eq!(frame.image_data().len(), 640 * 480 * 3);
            assert_eq!(frame.host_timing.fno, expected_fno);
        }
        cam.acquisition_stop().unwrap();
        cam.property_int_set("Width", 320).unwrap();
    }

    #[test]
    fn software_trigger() {
        let mut cam = open_first();
        cam.set_resolution(64, 64).unwrap();
        cam.property_enum_set("TriggerMode", "On").unwrap();
        cam.acquisition_start().unwrap();
        assert!(matches!(
            cam.snap_single(Duration::from_millis(5)),
            Err(Error::Timeout)
        ));
        cam.command_execute("TriggerSoftware").unwrap();
        let frame = cam.snap_single(Duration::from_millis(5)).unwrap();
        assert_eq!(frame.width(), 64);
    }

    #[test]
    fn reverse_x_mirrors_frames() {
        let mut cam = open_first();
        cam.set_resolution(16, 16).unwrap();
        cam.property_enum_set("PixelFormat", "Mono8").unwrap();
        assert!(!cam.property_bool("ReverseX").unwrap());

        cam.acquisition_start().unwrap();
        let plain = cam.snap_single(Duration::from_secs(1)).unwrap();
        cam.acquisition_stop().unwrap();

        cam.property_bool_set("ReverseX", true).unwrap();
        assert!(cam.property_bool("ReverseX").unwrap());
        cam.acquisition_start().unwrap();
        let mirrored = cam.snap_single(Duration::from_secs(1)).unwrap();

        // both are the first frame of their session
        let plain_row = &plain.image_data()[..16];
        let mut expected = plain_row.to_vec();
        expected.reverse();
        assert_eq!(&mirrored.image_data()[..16], &expected[..]);
    }

    #[test]
    fn descriptors_cover_all_nodes() {
        let cam = open_first();
        let props = cam.properties().unwrap();
        assert!(props.len() > 10);
        let names: Vec<String> = props.iter().map(|p| p.name()).collect();
        for id in [PropId::Width, PropId::ExposureTime, PropId::BinningVertical] {
            assert!(names.iter().any(|n| n == id.as_str()));
        }
        let width = cam.property_find("Width").unwrap();
        assert_eq!(width.field("maximum").unwrap().as_i64(), Some(5472));
    }
}
