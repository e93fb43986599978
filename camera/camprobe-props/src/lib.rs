//! Export the property descriptors of a camera to a CSV table.
//!
//! Each descriptor is reflected into a [PropertyRecord] (every public field,
//! unreadable ones recorded as sentinel strings), reordered so the most useful
//! fields come first, and written as one row of a table whose columns are the
//! union of all fields seen.

use std::path::PathBuf;

use camprobe_iface::{Camera, CameraModule, DeviceInfo};
use indexmap::IndexMap;
use tracing::info;

mod reflect;
mod reorder;
mod table;

pub use reflect::{NOT_ACCESSIBLE, RESERVED_PREFIX, reflect_properties};
pub use reorder::{LEADING_FIELDS, reorder_fields};
pub use table::{PropertyTable, export_properties_to_csv};

/// Field name to value, in insertion order. `None` marks a field that was
/// inserted as absent.
pub type PropertyRecord = IndexMap<String, Option<camprobe_iface::Value>>;

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "ic4_properties.csv";

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("camera error: {source}")]
    Camera {
        #[from]
        source: camprobe_iface::Error,
    },
    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("could not replace output file: {source}")]
    Persist { source: std::io::Error },
}

fn _test_error_is_send() {
    // Compile-time test to ensure ExportError implements Send trait.
    fn implements<T: Send>() {}
    implements::<ExportError>();
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// What to export, and where.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Unique name or serial number of the device. The first device if `None`.
    pub device: Option<String>,
    /// Width and height to set before reading the descriptors.
    pub resolution: Option<(i64, i64)>,
    pub output: PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            device: None,
            resolution: Some((5472, 3648)),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

/// Result of a successful [run_export].
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub serial: String,
    pub rows: usize,
    pub columns: usize,
    pub output: PathBuf,
}

/// Open a device, apply the resolution and write all its property
/// descriptors to the output file.
///
/// If no device is attached this returns [camprobe_iface::Error::NoDevices]
/// before opening anything.
pub fn run_export<M: CameraModule>(module: &mut M, opts: &ExportOptions) -> Result<ExportSummary> {
    let infos = camprobe_iface::print_device_list(module)?;
    let unique_name = camprobe_iface::select_device(&infos, opts.device.as_deref())?
        .unique_name()
        .to_string();

    let mut cam = module.open(&unique_name)?;
    info!("opened {}", camprobe_iface::format_device_info(&cam));

    if let Some((width, height)) = opts.resolution {
        cam.set_resolution(width, height)?;
    }

    let descriptors = cam.properties()?;
    let table = PropertyTable::from_descriptors(&descriptors);
    table.export_csv(&opts.output)?;

    let summary = ExportSummary {
        serial: cam.serial().to_string(),
        rows: table.len(),
        columns: table.columns().len(),
        output: opts.output.clone(),
    };
    info!(
        "exported {} properties ({} columns) to \"{}\"",
        summary.rows,
        summary.columns,
        summary.output.display()
    );
    Ok(summary)
}
