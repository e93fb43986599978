//! A GenICam-style feature tree for the simulated camera.

use camprobe_iface::{Error, FieldReadError, PropId, PropertyDescriptor, Result, Value};

/// Rows the simulated sensor reads per second at full resolution.
const READOUT_ROWS_PER_SEC: f64 = 18.0 * 3648.0;
const MAX_FRAME_RATE: f64 = 1000.0;
const MIN_FRAME_RATE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Visibility {
    Beginner,
    Expert,
    Guru,
}

impl Visibility {
    fn as_str(&self) -> &'static str {
        match self {
            Visibility::Beginner => "Beginner",
            Visibility::Expert => "Expert",
            Visibility::Guru => "Guru",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeKind {
    Integer {
        value: i64,
        min: i64,
        max: i64,
        inc: i64,
        unit: &'static str,
        /// If set, only these values are valid.
        value_set: Option<Vec<i64>>,
    },
    Float {
        value: f64,
        min: f64,
        max: f64,
        inc: Option<f64>,
        unit: &'static str,
        precision: i64,
    },
    Enumeration {
        value: String,
        entries: Vec<&'static str>,
    },
    Boolean {
        value: bool,
    },
    String {
        value: String,
        max_length: i64,
    },
    Command {
        done: bool,
    },
}

impl NodeKind {
    fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Integer { .. } => "Integer",
            NodeKind::Float { .. } => "Float",
            NodeKind::Enumeration { .. } => "Enumeration",
            NodeKind::Boolean { .. } => "Boolean",
            NodeKind::String { .. } => "String",
            NodeKind::Command { .. } => "Command",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) name: &'static str,
    display_name: &'static str,
    description: &'static str,
    visibility: Visibility,
    pub(crate) kind: NodeKind,
    readonly: bool,
    pub(crate) locked: bool,
    pub(crate) available: bool,
    handle: usize,
}

impl Node {
    fn new(
        name: &'static str,
        display_name: &'static str,
        description: &'static str,
        kind: NodeKind,
    ) -> Self {
        Self {
            name,
            display_name,
            description,
            visibility: Visibility::Beginner,
            kind,
            readonly: false,
            locked: false,
            available: true,
            handle: 0,
        }
    }

    fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    fn check_writable(&self) -> Result<()> {
        if !self.available {
            return Err(Error::property(self.name, "not available"));
        }
        if self.readonly {
            return Err(Error::property(self.name, "not writable"));
        }
        if self.locked {
            return Err(Error::property(self.name, "locked"));
        }
        Ok(())
    }

    fn check_readable(&self) -> Result<()> {
        if !self.available {
            return Err(Error::property(self.name, "not available"));
        }
        Ok(())
    }

    fn current_value(&self) -> Option<Value> {
        match &self.kind {
            NodeKind::Integer { value, .. } => Some(Value::Integer(*value)),
            NodeKind::Float { value, .. } => Some(Value::Float(*value)),
            NodeKind::Enumeration { value, .. } => Some(Value::Text(value.clone())),
            NodeKind::Boolean { value } => Some(Value::Boolean(*value)),
            NodeKind::String { value, .. } => Some(Value::Text(value.clone())),
            NodeKind::Command { .. } => None,
        }
    }

    fn field_names(&self) -> Vec<String> {
        let mut names = vec![
            "_handle",
            "name",
            "display_name",
            "description",
            "tooltip",
            "type",
            "visibility",
            "is_available",
            "is_locked",
            "is_readonly",
        ];
        match &self.kind {
            NodeKind::Integer { .. } => names.extend([
                "value",
                "minimum",
                "maximum",
                "increment",
                "inc_mode",
                "valid_value_set",
                "unit",
                "representation",
            ]),
            NodeKind::Float { .. } => names.extend([
                "value",
                "minimum",
                "maximum",
                "increment",
                "unit",
                "display_notation",
                "display_precision",
            ]),
            NodeKind::Enumeration { .. } => names.extend(["value", "entries"]),
            NodeKind::Boolean { .. } => names.push("value"),
            NodeKind::String { .. } => names.extend(["value", "max_length"]),
            NodeKind::Command { .. } => names.push("is_done"),
        }
        names.into_iter().map(String::from).collect()
    }

    fn field(&self, field: &str) -> std::result::Result<Value, FieldReadError> {
        let common = match field {
            "_handle" => Some(Value::Integer(self.handle as i64)),
            "name" => Some(Value::from(self.name)),
            "display_name" => Some(Value::from(self.display_name)),
            "description" => Some(Value::from(self.description)),
            "tooltip" => Some(Value::from(self.description)),
            "type" => Some(Value::from(self.kind.type_name())),
            "visibility" => Some(Value::from(self.visibility.as_str())),
            "is_available" => Some(Value::Boolean(self.available)),
            "is_locked" => Some(Value::Boolean(self.locked)),
            "is_readonly" => Some(Value::Boolean(self.readonly)),
            _ => None,
        };
        if let Some(v) = common {
            return Ok(v);
        }

        if field == "value" {
            if !self.available {
                return Err(FieldReadError::Failed(format!(
                    "{}: property is not available",
                    self.name
                )));
            }
            return self.current_value().ok_or(FieldReadError::NotPresent);
        }

        match (&self.kind, field) {
            (NodeKind::Integer { min, .. }, "minimum") => Ok(Value::Integer(*min)),
            (NodeKind::Integer { max, .. }, "maximum") => Ok(Value::Integer(*max)),
            (NodeKind::Integer { inc, .. }, "increment") => Ok(Value::Integer(*inc)),
            (NodeKind::Integer { value_set, .. }, "inc_mode") => Ok(Value::from(
                if value_set.is_some() {
                    "ValueSet"
                } else {
                    "Increment"
                },
            )),
            (NodeKind::Integer { value_set, .. }, "valid_value_set") => match value_set {
                Some(set) => Ok(Value::Text(
                    set.iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                )),
                None => Err(FieldReadError::NotPresent),
            },
            (NodeKind::Integer { unit, .. }, "unit") => Ok(Value::from(*unit)),
            (NodeKind::Integer { .. }, "representation") => Ok(Value::from("Linear")),
            (NodeKind::Float { min, .. }, "minimum") => Ok(Value::Float(*min)),
            (NodeKind::Float { max, .. }, "maximum") => Ok(Value::Float(*max)),
            (NodeKind::Float { inc, .. }, "increment") => inc.map(Value::Float).ok_or_else(|| {
                FieldReadError::Failed(format!("{}: property has no increment", self.name))
            }),
            (NodeKind::Float { unit, .. }, "unit") => Ok(Value::from(*unit)),
            (NodeKind::Float { .. }, "display_notation") => Ok(Value::from("Automatic")),
            (NodeKind::Float { precision, .. }, "display_precision") => {
                Ok(Value::Integer(*precision))
            }
            (NodeKind::Enumeration { entries, .. }, "entries") => {
                Ok(Value::Text(entries.join(", ")))
            }
            (NodeKind::String { max_length, .. }, "max_length") => {
                Ok(Value::Integer(*max_length))
            }
            (NodeKind::Command { done }, "is_done") => Ok(Value::Boolean(*done)),
            _ => Err(FieldReadError::NotPresent),
        }
    }
}

/// Owned copy of a node, handed out as a [PropertyDescriptor].
#[derive(Debug, Clone)]
pub struct NodeSnapshot {
    node: Node,
}

impl PropertyDescriptor for NodeSnapshot {
    fn field_names(&self) -> Vec<String> {
        self.node.field_names()
    }
    fn field(&self, name: &str) -> std::result::Result<Value, FieldReadError> {
        self.node.field(name)
    }
    fn name(&self) -> String {
        self.node.name.to_string()
    }
}

/// Static description of the simulated sensor.
#[derive(Debug, Clone)]
pub(crate) struct SensorSpec {
    pub(crate) vendor: String,
    pub(crate) model: String,
    pub(crate) serial: String,
    pub(crate) width: i64,
    pub(crate) height: i64,
}

/// Names of the nodes that cannot change while acquiring.
const TL_LOCKED: &[PropId] = &[
    PropId::Width,
    PropId::Height,
    PropId::PixelFormat,
    PropId::BinningHorizontal,
    PropId::BinningVertical,
];

/// All nodes of one simulated device, in feature tree order.
#[derive(Debug, Clone)]
pub(crate) struct NodeMap {
    nodes: Vec<Node>,
    sensor_width: i64,
    sensor_height: i64,
}

impl NodeMap {
    pub(crate) fn new(spec: &SensorSpec) -> Self {
        let text = |value: &str, max_length: i64| NodeKind::String {
            value: value.to_string(),
            max_length,
        };
        let mut nodes = vec![
            Node::new(
                "DeviceVendorName",
                "Device Vendor Name",
                "Name of the manufacturer of the device.",
                text(spec.vendor.as_str(), 64),
            )
            .readonly(),
            Node::new(
                "DeviceModelName",
                "Device Model Name",
                "Model of the device.",
                text(spec.model.as_str(), 64),
            )
            .readonly(),
            Node::new(
                "DeviceSerialNumber",
                "Device Serial Number",
                "Serial number of the device.",
                text(spec.serial.as_str(), 16),
            )
            .readonly(),
            Node::new(
                "DeviceVersion",
                "Device Version",
                "Version of the device.",
                text("1.0.0 (sim)", 32),
            )
            .readonly(),
            Node::new(
                "DeviceTemperature",
                "Device Temperature",
                "Temperature of the sensor board.",
                NodeKind::Float {
                    value: 0.0,
                    min: -40.0,
                    max: 125.0,
                    inc: None,
                    unit: "C",
                    precision: 1,
                },
            )
            .readonly()
            .visibility(Visibility::Expert)
            .unavailable(),
            Node::new(
                "SensorWidth",
                "Sensor Width",
                "Effective width of the sensor in pixels.",
                NodeKind::Integer {
                    value: spec.width,
                    min: spec.width,
                    max: spec.width,
                    inc: 1,
                    unit: "",
                    value_set: None,
                },
            )
            .readonly()
            .visibility(Visibility::Expert),
            Node::new(
                "SensorHeight",
                "Sensor Height",
                "Effective height of the sensor in pixels.",
                NodeKind::Integer {
                    value: spec.height,
                    min: spec.height,
                    max: spec.height,
                    inc: 1,
                    unit: "",
                    value_set: None,
                },
            )
            .readonly()
            .visibility(Visibility::Expert),
            Node::new(
                PropId::Width.as_str(),
                "Width",
                "Width of the image provided by the device (in pixels).",
                NodeKind::Integer {
                    value: 1920,
                    min: 16,
                    max: spec.width,
                    inc: 8,
                    unit: "",
                    value_set: None,
                },
            ),
            Node::new(
                PropId::Height.as_str(),
                "Height",
                "Height of the image provided by the device (in pixels).",
                NodeKind::Integer {
                    value: 1080,
                    min: 16,
                    max: spec.height,
                    inc: 8,
                    unit: "",
                    value_set: None,
                },
            ),
            Node::new(
                PropId::PixelFormat.as_str(),
                "Pixel Format",
                "Format of the pixels provided by the device.",
                NodeKind::Enumeration {
                    value: "Mono8".to_string(),
                    entries: vec!["Mono8", "RGB8"],
                },
            ),
            Node::new(
                PropId::BinningHorizontal.as_str(),
                "Binning Horizontal",
                "Number of horizontal photo-sensitive cells to combine together.",
                NodeKind::Integer {
                    value: 1,
                    min: 1,
                    max: 4,
                    inc: 1,
                    unit: "",
                    value_set: Some(vec![1, 2, 4]),
                },
            )
            .visibility(Visibility::Expert),
            Node::new(
                PropId::BinningVertical.as_str(),
                "Binning Vertical",
                "Number of vertical photo-sensitive cells to combine together.",
                NodeKind::Integer {
                    value: 1,
                    min: 1,
                    max: 4,
                    inc: 1,
                    unit: "",
                    value_set: Some(vec![1, 2, 4]),
                },
            )
            .visibility(Visibility::Expert),
            Node::new(
                PropId::ExposureAuto.as_str(),
                "Exposure Auto",
                "Sets the automatic exposure mode.",
                NodeKind::Enumeration {
                    value: "Continuous".to_string(),
                    entries: vec!["Off", "Continuous"],
                },
            ),
            Node::new(
                PropId::ExposureTime.as_str(),
                "Exposure Time",
                "Exposure time in microseconds.",
                NodeKind::Float {
                    value: 10_000.0,
                    min: 20.0,
                    max: 4_000_000.0,
                    inc: None,
                    unit: "us",
                    precision: 0,
                },
            ),
            Node::new(
                PropId::GainAuto.as_str(),
                "Gain Auto",
                "Sets the automatic gain control mode.",
                NodeKind::Enumeration {
                    value: "Off".to_string(),
                    entries: vec!["Off", "Continuous"],
                },
            ),
            Node::new(
                PropId::Gain.as_str(),
                "Gain",
                "Gain applied to the image in dB.",
                NodeKind::Float {
                    value: 0.0,
                    min: 0.0,
                    max: 48.0,
                    inc: Some(0.1),
                    unit: "dB",
                    precision: 1,
                },
            ),
            Node::new(
                PropId::AcquisitionFrameRate.as_str(),
                "Acquisition Frame Rate",
                "Frame rate at which frames are acquired, in Hz.",
                NodeKind::Float {
                    value: 15.0,
                    min: MIN_FRAME_RATE,
                    max: MAX_FRAME_RATE,
                    inc: None,
                    unit: "Hz",
                    precision: 2,
                },
            ),
            Node::new(
                PropId::TriggerMode.as_str(),
                "Trigger Mode",
                "Controls if the selected trigger is active.",
                NodeKind::Enumeration {
                    value: "Off".to_string(),
                    entries: vec!["Off", "On"],
                },
            ),
            Node::new(
                PropId::ReverseX.as_str(),
                "Reverse X",
                "Flip the image horizontally (\"mirror\"), before binning.",
                NodeKind::Boolean { value: false },
            )
            .visibility(Visibility::Expert),
            Node::new(
                PropId::TriggerSoftware.as_str(),
                "Trigger Software",
                "Generates an internal trigger.",
                NodeKind::Command { done: true },
            )
            .visibility(Visibility::Guru),
        ];
        for (i, node) in nodes.iter_mut().enumerate() {
            node.handle = 0x1000 + i;
        }
        let mut map = Self {
            nodes,
            sensor_width: spec.width,
            sensor_height: spec.height,
        };
        map.update_dependencies();
        map
    }

    fn get(&self, name: &str) -> Result<&Node> {
        self.nodes
            .iter()
            .find(|n| n.name == name)
            .ok_or_else(|| Error::PropertyNotFound(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Node> {
        self.nodes
            .iter_mut()
            .find(|n| n.name == name)
            .ok_or_else(|| Error::PropertyNotFound(name.to_string()))
    }

    pub(crate) fn snapshot(&self, name: &str) -> Result<NodeSnapshot> {
        Ok(NodeSnapshot {
            node: self.get(name)?.clone(),
        })
    }

    pub(crate) fn snapshots(&self) -> Vec<NodeSnapshot> {
        self.nodes
            .iter()
            .map(|node| NodeSnapshot { node: node.clone() })
            .collect()
    }

    pub(crate) fn int(&self, name: &str) -> Result<i64> {
        let node = self.get(name)?;
        node.check_readable()?;
        match &node.kind {
            NodeKind::Integer { value, .. } => Ok(*value),
            _ => Err(Error::property(name, "not an integer property")),
        }
    }

    pub(crate) fn float(&self, name: &str) -> Result<f64> {
        let node = self.get(name)?;
        node.check_readable()?;
        match &node.kind {
            NodeKind::Float { value, .. } => Ok(*value),
            _ => Err(Error::property(name, "not a float property")),
        }
    }

    pub(crate) fn enumeration(&self, name: &str) -> Result<String> {
        let node = self.get(name)?;
        node.check_readable()?;
        match &node.kind {
            NodeKind::Enumeration { value, .. } => Ok(value.clone()),
            _ => Err(Error::property(name, "not an enumeration property")),
        }
    }

    pub(crate) fn boolean(&self, name: &str) -> Result<bool> {
        let node = self.get(name)?;
        node.check_readable()?;
        match &node.kind {
            NodeKind::Boolean { value } => Ok(*value),
            _ => Err(Error::property(name, "not a boolean property")),
        }
    }

    pub(crate) fn set_int(&mut self, name: &str, new_value: i64) -> Result<()> {
        let node = self.get_mut(name)?;
        node.check_writable()?;
        match &mut node.kind {
            NodeKind::Integer {
                value,
                min,
                max,
                inc,
                value_set,
                ..
            } => {
                if new_value < *min || new_value > *max {
                    return Err(Error::property(
                        name,
                        format!("value {new_value} out of range [{min}, {max}]"),
                    ));
                }
                match value_set {
                    Some(set) => {
                        if !set.contains(&new_value) {
                            return Err(Error::property(
                                name,
                                format!("value {new_value} not in valid value set {set:?}"),
                            ));
                        }
                    }
                    None => {
                        if (new_value - *min) % *inc != 0 {
                            return Err(Error::property(
                                name,
                                format!("value {new_value} does not match increment {inc}"),
                            ));
                        }
                    }
                }
                *value = new_value;
            }
            _ => return Err(Error::property(name, "not an integer property")),
        }
        self.update_dependencies();
        Ok(())
    }

    pub(crate) fn set_float(&mut self, name: &str, new_value: f64) -> Result<()> {
        let node = self.get_mut(name)?;
        node.check_writable()?;
        match &mut node.kind {
            NodeKind::Float {
                value, min, max, ..
            } => {
                if !(new_value >= *min && new_value <= *max) {
                    return Err(Error::property(
                        name,
                        format!("value {new_value} out of range [{min}, {max}]"),
                    ));
                }
                *value = new_value;
            }
            _ => return Err(Error::property(name, "not a float property")),
        }
        self.update_dependencies();
        Ok(())
    }

    pub(crate) fn set_enum(&mut self, name: &str, new_value: &str) -> Result<()> {
        let node = self.get_mut(name)?;
        node.check_writable()?;
        match &mut node.kind {
            NodeKind::Enumeration { value, entries } => {
                if !entries.contains(&new_value) {
                    return Err(Error::property(
                        name,
                        format!("entry \"{new_value}\" not one of {entries:?}"),
                    ));
                }
                *value = new_value.to_string();
            }
            _ => return Err(Error::property(name, "not an enumeration property")),
        }
        self.update_dependencies();
        Ok(())
    }

    pub(crate) fn set_bool(&mut self, name: &str, new_value: bool) -> Result<()> {
        let node = self.get_mut(name)?;
        node.check_writable()?;
        match &mut node.kind {
            NodeKind::Boolean { value } => *value = new_value,
            _ => return Err(Error::property(name, "not a boolean property")),
        }
        self.update_dependencies();
        Ok(())
    }

    /// Check that `name` is an executable command.
    pub(crate) fn check_command(&self, name: &str) -> Result<()> {
        let node = self.get(name)?;
        node.check_writable()?;
        match &node.kind {
            NodeKind::Command { .. } => Ok(()),
            _ => Err(Error::property(name, "not a command")),
        }
    }

    /// Lock or unlock the transport-layer parameters.
    pub(crate) fn set_tl_params_locked(&mut self, locked: bool) {
        for node in self.nodes.iter_mut() {
            if TL_LOCKED.iter().any(|id| id.as_str() == node.name) {
                node.locked = locked;
            }
        }
    }

    /// Maximum frame rate for the current geometry and exposure.
    fn max_frame_rate(&self) -> f64 {
        let height = self.int(PropId::Height.as_str()).unwrap_or(self.sensor_height);
        let exposure_us = self
            .float(PropId::ExposureTime.as_str())
            .unwrap_or(10_000.0);
        let readout_limit = READOUT_ROWS_PER_SEC / height.max(1) as f64;
        let exposure_limit = 1e6 / exposure_us;
        readout_limit
            .min(exposure_limit)
            .clamp(MIN_FRAME_RATE, MAX_FRAME_RATE)
    }

    /// Recompute bounds and locks that depend on other nodes.
    fn update_dependencies(&mut self) {
        let bin_h = self.int(PropId::BinningHorizontal.as_str()).unwrap_or(1);
        let bin_v = self.int(PropId::BinningVertical.as_str()).unwrap_or(1);
        let width_max = self.sensor_width / bin_h;
        let height_max = self.sensor_height / bin_v;
        for (id, new_max) in [(PropId::Width, width_max), (PropId::Height, height_max)] {
            if let Ok(node) = self.get_mut(id.as_str()) {
                if let NodeKind::Integer {
                    value, min, max, inc, ..
                } = &mut node.kind
                {
                    // Keep the maximum on the increment grid.
                    *max = new_max - (new_max - *min) % *inc;
                    if *value > *max {
                        *value = *max;
                    }
                }
            }
        }

        let exposure_auto = self
            .enumeration(PropId::ExposureAuto.as_str())
            .unwrap_or_default();
        if let Ok(node) = self.get_mut(PropId::ExposureTime.as_str()) {
            node.locked = exposure_auto != "Off";
        }

        let fps_max = self.max_frame_rate();
        if let Ok(node) = self.get_mut(PropId::AcquisitionFrameRate.as_str()) {
            if let NodeKind::Float { value, max, .. } = &mut node.kind {
                *max = fps_max;
                if *value > *max {
                    *value = *max;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> SensorSpec {
        SensorSpec {
            vendor: "Simulated".into(),
            model: "SIM-33UX183".into(),
            serial: "40910001".into(),
            width: 5472,
            height: 3648,
        }
    }

    #[test]
    fn integer_bounds_and_increment() {
        let mut map = NodeMap::new(&spec());
        map.set_int("Width", 5472).unwrap();
        assert_eq!(map.int("Width").unwrap(), 5472);
        assert!(map.set_int("Width", 5480).is_err());
        assert!(map.set_int("Width", 1001).is_err());
        assert!(map.set_int("Width", 8).is_err());
    }

    #[test]
    fn binning_shrinks_geometry() {
        let mut map = NodeMap::new(&spec());
        map.set_int("Width", 5472).unwrap();
        map.set_int("Height", 3648).unwrap();
        map.set_int("BinningHorizontal", 2).unwrap();
        map.set_int("BinningVertical", 2).unwrap();
        assert_eq!(map.int("Width").unwrap(), 2736);
        assert_eq!(map.int("Height").unwrap(), 1824);
        assert!(map.set_int("Width", 5472).is_err());
        assert!(map.set_int("BinningHorizontal", 3).is_err());
    }

    #[test]
    fn exposure_time_locked_by_auto() {
        let mut map = NodeMap::new(&spec());
        assert!(map.set_float("ExposureTime", 6250.0).is_err());
        map.set_enum("ExposureAuto", "Off").unwrap();
        map.set_float("ExposureTime", 6250.0).unwrap();
        assert_eq!(map.float("ExposureTime").unwrap(), 6250.0);
    }

    #[test]
    fn frame_rate_maximum_follows_height() {
        let mut map = NodeMap::new(&spec());
        map.set_enum("ExposureAuto", "Off").unwrap();
        map.set_float("ExposureTime", 6250.0).unwrap();
        map.set_int("Height", 3648).unwrap();
        let full = map.max_frame_rate();
        map.set_int("Height", 1824).unwrap();
        let half = map.max_frame_rate();
        assert!((full - 18.0).abs() < 1e-9);
        assert!((half - 36.0).abs() < 1e-9);
    }

    #[test]
    fn read_only_nodes_reject_writes() {
        let mut map = NodeMap::new(&spec());
        assert!(map.set_int("SensorWidth", 100).is_err());
        assert!(matches!(
            map.set_int("NoSuchNode", 1),
            Err(Error::PropertyNotFound(_))
        ));
    }

    #[test]
    fn tl_locked_during_acquisition() {
        let mut map = NodeMap::new(&spec());
        map.set_tl_params_locked(true);
        assert!(map.set_enum("PixelFormat", "RGB8").is_err());
        map.set_tl_params_locked(false);
        map.set_enum("PixelFormat", "RGB8").unwrap();
    }

    #[test]
    fn snapshot_fields() {
        let map = NodeMap::new(&spec());
        let snap = map.snapshot("BinningHorizontal").unwrap();
        let names = snap.field_names();
        assert_eq!(names[0], "_handle");
        assert!(names.iter().any(|n| n == "valid_value_set"));
        assert_eq!(snap.field("valid_value_set").unwrap().to_string(), "1, 2, 4");
        assert_eq!(snap.field("inc_mode").unwrap().to_string(), "ValueSet");

        let width = map.snapshot("Width").unwrap();
        assert_eq!(
            width.field("valid_value_set"),
            Err(FieldReadError::NotPresent)
        );

        let temperature = map.snapshot("DeviceTemperature").unwrap();
        assert!(matches!(
            temperature.field("value"),
            Err(FieldReadError::Failed(_))
        ));
        assert!(matches!(
            temperature.field("increment"),
            Err(FieldReadError::Failed(_))
        ));
    }

    #[test]
    fn boolean_node() {
        let mut map = NodeMap::new(&spec());
        assert!(!map.boolean("ReverseX").unwrap());
        map.set_bool("ReverseX", true).unwrap();
        assert!(map.boolean("ReverseX").unwrap());
        assert_eq!(
            map.snapshot("ReverseX").unwrap().field("value"),
            Ok(Value::Boolean(true))
        );
        assert!(map.set_bool("Width", true).is_err());
        assert!(map.boolean("Width").is_err());
    }
}
