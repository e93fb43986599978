//! Camera interface traits used by the camprobe tools.
//!
//! A backend crate implements [CameraModule] (device enumeration) and
//! [Camera] (an opened device with its property map and a capture session).
//! Property metadata is exposed through [PropertyDescriptor], an explicit
//! field-iteration interface, so callers never need to know the concrete
//! descriptor type of a backend.

use std::time::Duration;

mod frame;
mod value;

pub use frame::{FrameBuffer, HostTimingInfo};
pub use value::{FieldReadError, PropId, Value};

// ---------------------------
// errors

pub type Result<M> = std::result::Result<M, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no devices found")]
    NoDevices,
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("Timeout")]
    Timeout,
    #[error("property not found: {0}")]
    PropertyNotFound(String),
    #[error("property {name}: {msg}")]
    PropertyError { name: String, msg: String },
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    #[error("unsupported pixel format: {0}")]
    UnsupportedPixelFormat(String),
    #[error("DeviceError({msg})")]
    DeviceError { msg: String },
    #[error("BackendError({0})")]
    BackendError(#[from] anyhow::Error),
    #[error("io error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

fn _test_error_is_send() {
    // Compile-time test to ensure Error implements Send trait.
    fn implements<T: Send>() {}
    implements::<Error>();
}

impl Error {
    pub fn property<N: Into<String>, M: Into<String>>(name: N, msg: M) -> Self {
        Error::PropertyError {
            name: name.into(),
            msg: msg.into(),
        }
    }
}

impl<'a> From<&'a str> for Error {
    fn from(orig: &'a str) -> Error {
        Error::DeviceError {
            msg: orig.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Error {
        Error::DeviceError { msg }
    }
}

// ---------------------------
// CameraModule

/// A module for enumerating and opening cameras.
pub trait CameraModule: Send {
    type CameraType: Camera;

    fn name(&self) -> &str;
    /// List attached devices. An empty list is not an error.
    fn device_infos(&self) -> Result<Vec<Box<dyn DeviceInfo>>>;
    /// Open the device with the given [DeviceInfo::unique_name].
    fn open(&mut self, unique_name: &str) -> Result<Self::CameraType>;
}

// ---------------------------
// DeviceInfo

pub trait DeviceInfo {
    /// Name unique among the attached devices, used to open a device.
    fn unique_name(&self) -> &str;
    fn model_name(&self) -> &str;
    fn serial(&self) -> &str;
    fn vendor(&self) -> &str;
}

/// Format a device the way the device list shows it.
pub fn format_device_info(info: &dyn DeviceInfo) -> String {
    format!("Model: {} Serial: {}", info.model_name(), info.serial())
}

/// Print all attached devices to stdout and return them.
pub fn print_device_list<M: CameraModule>(module: &M) -> Result<Vec<Box<dyn DeviceInfo>>> {
    println!("Enumerating all attached video capture devices...");

    let infos = module.device_infos()?;
    if infos.is_empty() {
        println!("No devices found");
        return Ok(infos);
    }

    println!("Found {} devices:", infos.len());
    for info in infos.iter() {
        println!("{}", format_device_info(info.as_ref()));
    }
    Ok(infos)
}

/// Choose a device by unique name or serial number, or the first device when
/// `wanted` is `None`.
pub fn select_device<'a>(
    infos: &'a [Box<dyn DeviceInfo>],
    wanted: Option<&str>,
) -> Result<&'a dyn DeviceInfo> {
    match wanted {
        None => infos.first().map(|x| x.as_ref()).ok_or(Error::NoDevices),
        Some(wanted) => {
            if infos.is_empty() {
                return Err(Error::NoDevices);
            }
            infos
                .iter()
                .map(|x| x.as_ref())
                .find(|info| info.unique_name() == wanted || info.serial() == wanted)
                .ok_or_else(|| Error::DeviceNotFound(wanted.to_string()))
        }
    }
}

// ---------------------------
// PropertyDescriptor

/// Metadata of one camera property, as a set of named readable fields.
///
/// The field set depends on the property type (an enumeration has `entries`,
/// an integer has `increment`, ...) and on the backend. Names starting with an
/// underscore are reserved for backend internals.
pub trait PropertyDescriptor {
    /// All field names, in a stable order.
    fn field_names(&self) -> Vec<String>;
    /// Read a single field.
    fn field(&self, name: &str) -> std::result::Result<Value, FieldReadError>;

    /// The property name, e.g. `ExposureTime`.
    fn name(&self) -> String {
        match self.field("name") {
            Ok(v) => v.to_string(),
            Err(_) => String::new(),
        }
    }
}

impl<T: PropertyDescriptor + ?Sized> PropertyDescriptor for Box<T> {
    fn field_names(&self) -> Vec<String> {
        (**self).field_names()
    }
    fn field(&self, name: &str) -> std::result::Result<Value, FieldReadError> {
        (**self).field(name)
    }
    fn name(&self) -> String {
        (**self).name()
    }
}

// ---------------------------
// Camera

pub trait Camera: DeviceInfo + Send {
    // ----- start: weakly typed property map access -----

    fn command_execute(&mut self, name: &str) -> Result<()>;
    fn property_bool(&self, name: &str) -> Result<bool>;
    fn property_bool_set(&mut self, name: &str, value: bool) -> Result<()>;
    fn property_enum(&self, name: &str) -> Result<String>;
    fn property_enum_set(&mut self, name: &str, value: &str) -> Result<()>;
    fn property_float(&self, name: &str) -> Result<f64>;
    fn property_float_set(&mut self, name: &str, value: f64) -> Result<()>;
    fn property_int(&self, name: &str) -> Result<i64>;
    fn property_int_set(&mut self, name: &str, value: i64) -> Result<()>;

    // ----- end: weakly typed property map access -----

    /// Snapshot of the descriptor of a single property.
    fn property_find(&self, name: &str) -> Result<Box<dyn PropertyDescriptor>>;

    /// Snapshots of the descriptors of all properties of the device.
    fn properties(&self) -> Result<Vec<Box<dyn PropertyDescriptor>>>;

    /// The `maximum` field of a property descriptor.
    fn property_maximum(&self, name: &str) -> Result<Value> {
        let descriptor = self.property_find(name)?;
        descriptor
            .field("maximum")
            .map_err(|e| Error::property(name, format!("maximum: {e}")))
    }

    /// The `minimum` field of a property descriptor.
    fn property_minimum(&self, name: &str) -> Result<Value> {
        let descriptor = self.property_find(name)?;
        descriptor
            .field("minimum")
            .map_err(|e| Error::property(name, format!("minimum: {e}")))
    }

    /// Set the image width and height, in that order.
    fn set_resolution(&mut self, width: i64, height: i64) -> Result<()> {
        self.property_int_set(PropId::Width.as_str(), width)?;
        self.property_int_set(PropId::Height.as_str(), height)
    }

    // Acquisition ----------------------------
    fn acquisition_start(&mut self) -> Result<()>;
    fn acquisition_stop(&mut self) -> Result<()>;
    fn is_acquiring(&self) -> bool;

    /// Wait up to `timeout` for the next frame and copy it out.
    ///
    /// Returns [Error::Timeout] if no frame arrived in time.
    fn snap_single(&mut self, timeout: Duration) -> Result<FrameBuffer>;
}
