/// A scalar value of a camera property or of a property descriptor field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value as `f64`. Integers are converted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

/// Convert a float to a string with a minimum precision of 1.
///
/// This ensures at least a ".0" at the end to allow distinguishing this is a
/// float (from an int).
fn float_to_str(val: f64) -> String {
    let orig = format!("{}", val);
    if orig.contains('.') || !val.is_finite() {
        orig
    } else {
        format!("{}.0", orig)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{v}"),
            Value::Float(v) => f.write_str(&float_to_str(*v)),
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Failure to read a single field of a [crate::PropertyDescriptor].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FieldReadError {
    /// The descriptor does not carry this field in its current state.
    #[error("attribute not present")]
    NotPresent,
    /// Reading the field failed for another reason.
    #[error("{0}")]
    Failed(String),
}

/// Standard (GenICam SFNC) names of the properties used by the camprobe tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropId {
    Width,
    Height,
    PixelFormat,
    ExposureAuto,
    ExposureTime,
    Gain,
    GainAuto,
    BinningHorizontal,
    BinningVertical,
    ReverseX,
    AcquisitionFrameRate,
    TriggerMode,
    TriggerSoftware,
}

impl PropId {
    pub const fn as_str(&self) -> &'static str {
        use PropId::*;
        match self {
            Width => "Width",
            Height => "Height",
            PixelFormat => "PixelFormat",
            ExposureAuto => "ExposureAuto",
            ExposureTime => "ExposureTime",
            Gain => "Gain",
            GainAuto => "GainAuto",
            BinningHorizontal => "BinningHorizontal",
            BinningVertical => "BinningVertical",
            ReverseX => "ReverseX",
            AcquisitionFrameRate => "AcquisitionFrameRate",
            TriggerMode => "TriggerMode",
            TriggerSoftware => "TriggerSoftware",
        }
    }
}

impl AsRef<str> for PropId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for PropId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[test]
fn test_float_to_str() {
    assert_eq!(&float_to_str(0f64), "0.0");
    assert_eq!(&float_to_str(10.0), "10.0");
    assert_eq!(&float_to_str(10.000001), "10.000001");
    assert_eq!(&float_to_str(f64::INFINITY), "inf");
}

#[test]
fn test_value_display() {
    assert_eq!(Value::Integer(640).to_string(), "640");
    assert_eq!(Value::Float(6250.0).to_string(), "6250.0");
    assert_eq!(Value::Boolean(true).to_string(), "True");
    assert_eq!(Value::Boolean(false).to_string(), "False");
    assert_eq!(Value::from("Mono8").to_string(), "Mono8");
}
